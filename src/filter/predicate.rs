// src/filter/predicate.rs

use std::collections::HashSet;

use crate::catalog::Product;

use super::{Dimension, DimensionSet, FilterState, PriceRange};

/// A [`FilterState`] normalized for repeated evaluation: selections are
/// lower-cased once and multi-select values held in hash sets.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    category: Option<String>,
    brands: HashSet<String>,
    colors: HashSet<String>,
    sizes: HashSet<String>,
    types: HashSet<String>,
    styles: Vec<String>,
    occasions: Vec<String>,
    price_range: Option<PriceRange>,
}

impl CompiledFilter {
    pub fn new(filter: &FilterState) -> Self {
        Self {
            category: filter
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_lowercase),
            brands: lower_set(&filter.brands),
            colors: lower_set(&filter.colors),
            sizes: lower_set(&filter.sizes),
            types: lower_set(&filter.types),
            styles: lower_terms(&filter.styles),
            occasions: lower_terms(&filter.occasions),
            price_range: filter.price_range,
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.failing_dimensions(product).is_empty()
    }

    /// Every active dimension the product does not satisfy.
    pub fn failing_dimensions(&self, product: &Product) -> DimensionSet {
        let mut failing = DimensionSet::EMPTY;

        if let Some(category) = &self.category {
            if !product.category.to_lowercase().contains(category.as_str()) {
                failing.insert(Dimension::Category);
            }
        }
        if !intersects(&self.brands, std::iter::once(&product.brand)) {
            failing.insert(Dimension::Brands);
        }
        if !intersects(&self.colors, &product.colors) {
            failing.insert(Dimension::Colors);
        }
        if !intersects(&self.sizes, &product.sizes) {
            failing.insert(Dimension::Sizes);
        }
        if !intersects(&self.types, &product.types) {
            failing.insert(Dimension::Types);
        }

        if !self.styles.is_empty() || !self.occasions.is_empty() {
            let description = product.description.to_lowercase();
            if !mentions_any(&self.styles, &description) {
                failing.insert(Dimension::Styles);
            }
            if !mentions_any(&self.occasions, &description) {
                failing.insert(Dimension::Occasions);
            }
        }

        if let Some(range) = &self.price_range {
            if !range.contains(product.price) {
                failing.insert(Dimension::PriceRange);
            }
        }

        failing
    }
}

/// Whether a single product satisfies every active dimension of `filter`.
pub fn matches(product: &Product, filter: &FilterState) -> bool {
    CompiledFilter::new(filter).matches(product)
}

fn lower_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn lower_terms(values: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::with_capacity(values.len());
    for term in values.iter().map(|v| v.trim().to_lowercase()) {
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

// An empty selection matches everything.
fn intersects<'a, I>(selected: &HashSet<String>, values: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    selected.is_empty()
        || values
            .into_iter()
            .any(|v| selected.contains(&v.trim().to_lowercase()))
}

fn mentions_any(terms: &[String], description: &str) -> bool {
    terms.is_empty() || terms.iter().any(|t| description.contains(t.as_str()))
}
