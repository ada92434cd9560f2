// src/facets.rs

//! Facet computation
//!
//! Facets describe, for every filterable dimension, which values occur in a
//! product set and how many products hold each one. Values are listed in the
//! order they are first seen, so output is deterministic for a given catalog
//! order. Style and occasion facets come from a closed vocabulary of
//! candidate terms searched for in product descriptions.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::filter::{CompiledFilter, Dimension, DimensionSet, FilterState, PriceRange};

/// Price facet reported when the facet input set is empty
pub const DEFAULT_PRICE_RANGE: PriceRange = PriceRange::new(0.0, 1000.0);

static DEFAULT_VOCABULARY: Lazy<Vocabulary> = Lazy::new(|| Vocabulary {
    styles: [
        "casual",
        "formal",
        "sport",
        "classic",
        "modern",
        "vintage",
        "elegant",
        "streetwear",
    ]
    .map(String::from)
    .to_vec(),
    occasions: [
        "wedding", "party", "work", "beach", "travel", "everyday", "evening", "gym",
    ]
    .map(String::from)
    .to_vec(),
    palette: [
        "bg-slate-900",
        "bg-red-500",
        "bg-blue-500",
        "bg-green-500",
        "bg-yellow-400",
        "bg-pink-400",
        "bg-purple-500",
        "bg-orange-400",
    ]
    .map(String::from)
    .to_vec(),
});

/// Candidate terms and color display tokens used to build facets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub styles: Vec<String>,
    pub occasions: Vec<String>,
    /// Display tokens assigned to colors by first-seen index, cycling
    pub palette: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        DEFAULT_VOCABULARY.clone()
    }
}

impl Vocabulary {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.palette.is_empty() {
            errors.push("vocabulary.palette must not be empty".to_string());
        }
        if self.styles.iter().chain(&self.occasions).any(|t| t.trim().is_empty()) {
            errors.push("vocabulary terms must not be blank".to_string());
        }
        errors
    }

    fn display_token(&self, index: usize) -> Option<&str> {
        if self.palette.is_empty() {
            None
        } else {
            Some(self.palette[index % self.palette.len()].as_str())
        }
    }
}

/// Which product set each dimension's facet is computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetScope {
    /// Every facet from the fully filtered set, including the facet's own
    /// dimension. A selected color narrows the color facet to itself.
    #[default]
    FullyFiltered,
    /// Each facet from the catalog filtered by all other dimensions, so
    /// alternatives within a selected dimension stay visible.
    ExcludeOwnDimension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorFacet {
    pub value: String,
    pub label: String,
    /// Presentation hint taken from the vocabulary palette
    pub display: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSet {
    pub categories: Vec<FacetValue>,
    pub brands: Vec<FacetValue>,
    pub types: Vec<FacetValue>,
    pub styles: Vec<FacetValue>,
    pub occasions: Vec<FacetValue>,
    pub colors: Vec<ColorFacet>,
    pub sizes: Vec<String>,
    pub price_range: PriceRange,
}

impl FacetSet {
    /// Facets of an empty product set
    pub fn empty(default_price_range: PriceRange) -> Self {
        Self {
            categories: Vec::new(),
            brands: Vec::new(),
            types: Vec::new(),
            styles: Vec::new(),
            occasions: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            price_range: default_price_range,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.brands.is_empty()
            && self.types.is_empty()
            && self.styles.is_empty()
            && self.occasions.is_empty()
            && self.colors.is_empty()
            && self.sizes.is_empty()
    }
}

/// Facets from one product set, typically the fully filtered set.
pub fn compute_facets<'a, I>(
    products: I,
    vocabulary: &Vocabulary,
    default_price_range: PriceRange,
) -> FacetSet
where
    I: IntoIterator<Item = &'a Product>,
{
    let every = contributing_dimensions(FacetScope::FullyFiltered, DimensionSet::EMPTY);
    let mut acc = FacetAccumulator::new(vocabulary);
    for product in products {
        acc.observe(product, every);
    }
    acc.finish(default_price_range)
}

/// Facets where each dimension sees the catalog filtered by every *other*
/// active dimension.
///
/// One pass: a product failing nothing feeds every facet, a product failing
/// exactly one dimension feeds only that dimension's facet.
pub fn compute_facets_excluding_own<'a, I>(
    catalog: I,
    filter: &FilterState,
    vocabulary: &Vocabulary,
    default_price_range: PriceRange,
) -> FacetSet
where
    I: IntoIterator<Item = &'a Product>,
{
    let compiled = CompiledFilter::new(filter);
    let mut acc = FacetAccumulator::new(vocabulary);
    for product in catalog {
        let failing = compiled.failing_dimensions(product);
        let feeds = contributing_dimensions(FacetScope::ExcludeOwnDimension, failing);
        if !feeds.is_empty() {
            acc.observe(product, feeds);
        }
    }
    acc.finish(default_price_range)
}

/// Distinct values in first-seen order with per-product counts
#[derive(Debug, Default)]
struct ValueCounter {
    index: HashMap<String, usize>,
    entries: Vec<CounterEntry>,
}

#[derive(Debug)]
struct CounterEntry {
    value: String,
    count: usize,
    last_product: usize,
}

impl ValueCounter {
    // Values differing only in case are one entry; the first spelling wins.
    fn add(&mut self, value: &str, product_seq: usize) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let key = value.to_lowercase();
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                if entry.last_product != product_seq {
                    entry.count += 1;
                    entry.last_product = product_seq;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(CounterEntry {
                    value: value.to_string(),
                    count: 1,
                    last_product: product_seq,
                });
            }
        }
    }

    fn into_values(self, label: fn(&str) -> String) -> Vec<FacetValue> {
        self.entries
            .into_iter()
            .map(|e| FacetValue {
                label: Some(label(&e.value)),
                value: e.value,
                count: Some(e.count),
            })
            .collect()
    }
}

struct FacetAccumulator<'v> {
    vocabulary: &'v Vocabulary,
    seq: usize,
    categories: ValueCounter,
    brands: ValueCounter,
    types: ValueCounter,
    colors: ValueCounter,
    sizes: ValueCounter,
    style_counts: Vec<usize>,
    occasion_counts: Vec<usize>,
    style_terms: Vec<String>,
    occasion_terms: Vec<String>,
    price: Option<PriceRange>,
}

impl<'v> FacetAccumulator<'v> {
    fn new(vocabulary: &'v Vocabulary) -> Self {
        let lower = |terms: &[String]| -> Vec<String> {
            terms.iter().map(|t| t.trim().to_lowercase()).collect()
        };
        Self {
            vocabulary,
            seq: 0,
            categories: ValueCounter::default(),
            brands: ValueCounter::default(),
            types: ValueCounter::default(),
            colors: ValueCounter::default(),
            sizes: ValueCounter::default(),
            style_counts: vec![0; vocabulary.styles.len()],
            occasion_counts: vec![0; vocabulary.occasions.len()],
            style_terms: lower(&vocabulary.styles),
            occasion_terms: lower(&vocabulary.occasions),
            price: None,
        }
    }

    /// Feeds a product to the facets of `dimensions`.
    fn observe(&mut self, product: &Product, dimensions: DimensionSet) {
        self.seq += 1;
        let seq = self.seq;
        let wants = |d: Dimension| dimensions.contains(d);

        if wants(Dimension::Category) {
            self.categories.add(&product.category, seq);
        }
        if wants(Dimension::Brands) {
            self.brands.add(&product.brand, seq);
        }
        if wants(Dimension::Types) {
            for value in &product.types {
                self.types.add(value, seq);
            }
        }
        if wants(Dimension::Colors) {
            for value in &product.colors {
                self.colors.add(value, seq);
            }
        }
        if wants(Dimension::Sizes) {
            for value in &product.sizes {
                self.sizes.add(value, seq);
            }
        }

        let want_styles = wants(Dimension::Styles);
        let want_occasions = wants(Dimension::Occasions);
        if want_styles || want_occasions {
            let description = product.description.to_lowercase();
            if want_styles {
                count_terms(&self.style_terms, &mut self.style_counts, &description);
            }
            if want_occasions {
                count_terms(&self.occasion_terms, &mut self.occasion_counts, &description);
            }
        }

        if wants(Dimension::PriceRange) {
            self.price = Some(match self.price {
                Some(range) => PriceRange::new(
                    range.min.min(product.price),
                    range.max.max(product.price),
                ),
                None => PriceRange::new(product.price, product.price),
            });
        }
    }

    fn finish(self, default_price_range: PriceRange) -> FacetSet {
        let vocabulary = self.vocabulary;
        let colors = self
            .colors
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| ColorFacet {
                label: capitalize(&e.value),
                display: vocabulary
                    .display_token(i)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.value.to_lowercase()),
                value: e.value,
                count: e.count,
            })
            .collect();

        FacetSet {
            categories: self.categories.into_values(category_label),
            brands: self.brands.into_values(capitalize),
            types: self.types.into_values(capitalize),
            styles: vocabulary_values(&vocabulary.styles, &self.style_counts),
            occasions: vocabulary_values(&vocabulary.occasions, &self.occasion_counts),
            colors,
            sizes: self.sizes.entries.into_iter().map(|e| e.value).collect(),
            price_range: self.price.unwrap_or(default_price_range),
        }
    }
}

fn count_terms(terms: &[String], counts: &mut [usize], description: &str) {
    for (term, count) in terms.iter().zip(counts.iter_mut()) {
        if !term.is_empty() && description.contains(term.as_str()) {
            *count += 1;
        }
    }
}

// Terms that occur in no product are dropped.
fn vocabulary_values(terms: &[String], counts: &[usize]) -> Vec<FacetValue> {
    terms
        .iter()
        .zip(counts)
        .filter(|(_, count)| **count > 0)
        .map(|(term, count)| FacetValue {
            value: term.clone(),
            label: Some(capitalize(term)),
            count: Some(*count),
        })
        .collect()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn category_label(value: &str) -> String {
    value
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Dimensions whose facet a product contributes to under `scope`, given
/// the active dimensions it fails.
fn contributing_dimensions(scope: FacetScope, failing: DimensionSet) -> DimensionSet {
    match (scope, failing.len()) {
        (_, 0) => Dimension::ALL.into_iter().collect(),
        (FacetScope::ExcludeOwnDimension, 1) => failing,
        _ => DimensionSet::EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use crate::filter::apply;
    use crate::mock::generate_catalog;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("1", "Runner", 80.0)
                .brand("Nike")
                .category("men/shoes")
                .colors(["black", "white"])
                .sizes(["42", "43"])
                .types(["sneakers"])
                .description("Modern sport shoe for the gym"),
            Product::new("2", "Gown", 250.0)
                .brand("Zara")
                .category("women/dresses")
                .colors(["red"])
                .sizes(["S", "M"])
                .types(["maxi"])
                .description("Elegant evening gown for a wedding"),
            Product::new("3", "Tee", 20.0)
                .brand("nike")
                .category("men/shirts")
                .colors(["White", "red"])
                .sizes(["M"])
                .types(["t-shirt"])
                .description("Casual everyday cotton tee"),
        ]
    }

    #[test]
    fn test_distinct_values_with_counts_in_first_seen_order() {
        let products = catalog();
        let facets = compute_facets(&products, &Vocabulary::default(), DEFAULT_PRICE_RANGE);

        let brands: Vec<(&str, Option<usize>)> = facets
            .brands
            .iter()
            .map(|v| (v.value.as_str(), v.count))
            .collect();
        assert_eq!(brands, vec![("Nike", Some(2)), ("Zara", Some(1))]);

        let colors: Vec<(&str, usize)> = facets
            .colors
            .iter()
            .map(|c| (c.value.as_str(), c.count))
            .collect();
        assert_eq!(colors, vec![("black", 1), ("white", 2), ("red", 2)]);

        assert_eq!(facets.sizes, vec!["42", "43", "S", "M"]);
        assert_eq!(facets.price_range, PriceRange::new(20.0, 250.0));
        assert_eq!(facets.categories[1].label.as_deref(), Some("Women / Dresses"));
    }

    #[test]
    fn test_styles_and_occasions_come_from_vocabulary() {
        let products = catalog();
        let facets = compute_facets(&products, &Vocabulary::default(), DEFAULT_PRICE_RANGE);

        let styles: Vec<&str> = facets.styles.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(styles, vec!["casual", "sport", "modern", "elegant"]);

        let occasions: Vec<&str> = facets.occasions.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(occasions, vec!["wedding", "everyday", "evening", "gym"]);
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocabulary = Vocabulary {
            styles: vec!["cotton".to_string()],
            occasions: vec![],
            palette: vec!["a".to_string(), "b".to_string()],
        };
        let products = catalog();
        let facets = compute_facets(&products, &vocabulary, DEFAULT_PRICE_RANGE);
        assert_eq!(facets.styles.len(), 1);
        assert_eq!(facets.styles[0].count, Some(1));
        assert!(facets.occasions.is_empty());

        let tokens: Vec<&str> = facets.colors.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(tokens, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_empty_set_falls_back_to_default_price_range() {
        let facets = compute_facets(
            std::iter::empty::<&Product>(),
            &Vocabulary::default(),
            DEFAULT_PRICE_RANGE,
        );
        assert!(facets.is_empty());
        assert_eq!(facets.price_range, PriceRange::new(0.0, 1000.0));
        assert_eq!(facets, FacetSet::empty(DEFAULT_PRICE_RANGE));
    }

    #[test]
    fn test_price_bounds_cover_every_product() {
        for seed in 0..30 {
            let snapshot = CatalogSnapshot::new(generate_catalog(50, seed)).unwrap();
            let set = apply(snapshot.products(), &FilterState::new().category("women"));
            let facets = compute_facets(set.iter(), &Vocabulary::default(), DEFAULT_PRICE_RANGE);
            for product in set.iter() {
                assert!(facets.price_range.contains(product.price));
            }
        }
    }

    #[test]
    fn test_fully_filtered_scope_narrows_own_dimension() {
        let products = catalog();
        let filter = FilterState::new().color("red");
        let set = apply(&products, &filter);
        let facets = compute_facets(set.iter(), &Vocabulary::default(), DEFAULT_PRICE_RANGE);
        let colors: Vec<&str> = facets.colors.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(colors, vec!["red", "White"]);
    }

    #[test]
    fn test_exclude_own_scope_keeps_alternatives() {
        let products = catalog();
        let filter = FilterState::new().color("red").brand("Nike");
        let facets = compute_facets_excluding_own(
            &products,
            &filter,
            &Vocabulary::default(),
            DEFAULT_PRICE_RANGE,
        );

        // Colors facet sees all Nike products.
        let colors: Vec<&str> = facets.colors.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(colors, vec!["black", "white", "red"]);

        // Brands facet sees all red products.
        let brands: Vec<&str> = facets.brands.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(brands, vec!["Zara", "nike"]);

        // Other facets see only the fully filtered product (the tee).
        assert_eq!(facets.sizes, vec!["M"]);
        assert_eq!(facets.price_range, PriceRange::new(20.0, 20.0));
    }

    #[test]
    fn test_scopes_agree_without_filters() {
        let products = generate_catalog(80, 7);
        let vocabulary = Vocabulary::default();
        let full = compute_facets(&products, &vocabulary, DEFAULT_PRICE_RANGE);
        let disjunctive = compute_facets_excluding_own(
            &products,
            &FilterState::new(),
            &vocabulary,
            DEFAULT_PRICE_RANGE,
        );
        assert_eq!(full, disjunctive);
    }

    #[test]
    fn test_contributing_dimensions() {
        let mut failing = DimensionSet::EMPTY;
        assert_eq!(
            contributing_dimensions(FacetScope::FullyFiltered, failing).len(),
            Dimension::ALL.len()
        );
        failing.insert(Dimension::Brands);
        assert!(contributing_dimensions(FacetScope::FullyFiltered, failing).is_empty());
        assert_eq!(
            contributing_dimensions(FacetScope::ExcludeOwnDimension, failing).only(),
            Some(Dimension::Brands)
        );
    }

    #[test]
    fn test_every_offered_value_selects_something() {
        let products = vec![
            Product::new("1", "Tee", 15.0)
                .brand(" Zara ")
                .category("women/tops")
                .colors([" red ", "Navy"])
                .sizes(["M ", " L"])
                .types([" t-shirt"]),
            Product::new("2", "Jacket", 90.0)
                .brand("Levi's")
                .category("men/outerwear")
                .colors(["black"])
                .sizes(["XL"])
                .types(["denim "]),
        ];
        let facets = compute_facets(&products, &Vocabulary::default(), DEFAULT_PRICE_RANGE);

        let selections = facets
            .brands
            .iter()
            .map(|v| FilterState::new().brand(v.value.clone()))
            .chain(facets.colors.iter().map(|c| FilterState::new().color(c.value.clone())))
            .chain(facets.sizes.iter().map(|s| FilterState::new().size(s.clone())))
            .chain(facets.types.iter().map(|v| FilterState::new().product_type(v.value.clone())))
            .chain(facets.categories.iter().map(|v| FilterState::new().category(v.value.clone())));

        let mut checked = 0;
        for filter in selections {
            assert!(!apply(&products, &filter).is_empty(), "{:?}", filter);
            checked += 1;
        }
        assert_eq!(checked, 2 + 3 + 3 + 2 + 2);
    }

    #[test]
    fn test_vocabulary_validation() {
        let mut vocabulary = Vocabulary::default();
        assert!(vocabulary.validate().is_empty());
        vocabulary.palette.clear();
        vocabulary.styles.push(" ".to_string());
        assert_eq!(vocabulary.validate().len(), 2);
    }
}
