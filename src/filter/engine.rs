// src/filter/engine.rs

use crate::catalog::Product;

use super::{CompiledFilter, FilterState};

/// Products satisfying a filter, in catalog order.
///
/// Borrows from the snapshot it was computed over and lives for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSet<'a> {
    products: Vec<&'a Product>,
}

impl<'a> FilteredSet<'a> {
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a Product] {
        &self.products
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Product> + '_ {
        self.products.iter().copied()
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.products.iter().map(|p| p.id.as_str()).collect()
    }
}

impl<'a> FromIterator<&'a Product> for FilteredSet<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Product>>(iter: I) -> Self {
        Self {
            products: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for FilteredSet<'a> {
    type Item = &'a Product;
    type IntoIter = std::vec::IntoIter<&'a Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.into_iter()
    }
}

/// Single linear pass keeping every product the filter matches.
///
/// No sorting, ranking or deduplication happens here. `filter` is assumed
/// to be validated already.
pub fn apply<'a, I>(products: I, filter: &FilterState) -> FilteredSet<'a>
where
    I: IntoIterator<Item = &'a Product>,
{
    let compiled = CompiledFilter::new(filter);
    products
        .into_iter()
        .filter(|product| compiled.matches(product))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use crate::mock::generate_catalog;

    fn priced(prices: &[f64]) -> CatalogSnapshot {
        CatalogSnapshot::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, price)| Product::new(format!("p{}", i), "Item", *price))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_brand_filter_keeps_relative_order() {
        let snapshot = CatalogSnapshot::new(vec![
            Product::new("1", "A", 10.0).brand("Nike"),
            Product::new("2", "B", 10.0).brand("Adidas"),
            Product::new("3", "C", 10.0).brand("Puma"),
            Product::new("4", "D", 10.0).brand("Nike"),
            Product::new("5", "E", 10.0).brand("Zara"),
        ])
        .unwrap();

        let set = apply(snapshot.products(), &FilterState::new().brand("Nike"));
        assert_eq!(set.ids(), vec!["1", "4"]);
    }

    #[test]
    fn test_price_range_filter() {
        let snapshot = priced(&[10.0, 25.0, 60.0, 45.0]);
        let set = apply(snapshot.products(), &FilterState::new().price_range(20.0, 50.0));
        let prices: Vec<f64> = set.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![25.0, 45.0]);
    }

    #[test]
    fn test_empty_filter_is_identity() {
        for seed in 0..20 {
            let snapshot = CatalogSnapshot::new(generate_catalog(40, seed)).unwrap();
            let set = apply(snapshot.products(), &FilterState::new());
            let all: Vec<&str> = snapshot.products().iter().map(|p| p.id.as_str()).collect();
            assert_eq!(set.ids(), all);
        }
    }

    #[test]
    fn test_result_is_subset_and_idempotent() {
        let filters = [
            FilterState::new().brand("Nike").brand("Zara"),
            FilterState::new().color("red").size("M"),
            FilterState::new().category("women").price_range(20.0, 200.0),
            FilterState::new().style("casual").occasion("party"),
        ];

        for seed in 0..25 {
            let snapshot = CatalogSnapshot::new(generate_catalog(60, seed)).unwrap();
            for filter in &filters {
                let once = apply(snapshot.products(), filter);
                for product in once.iter() {
                    assert!(snapshot.get(&product.id).is_some());
                    assert!(crate::filter::matches(product, filter));
                }

                let twice = apply(once.iter(), filter);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_narrowing_price_range_is_monotonic() {
        for seed in 0..25 {
            let snapshot = CatalogSnapshot::new(generate_catalog(60, seed)).unwrap();
            let wide = apply(
                snapshot.products(),
                &FilterState::new().brand("Nike").price_range(0.0, 400.0),
            );
            let narrow = apply(
                snapshot.products(),
                &FilterState::new().brand("Nike").price_range(50.0, 150.0),
            );
            let wide_ids = wide.ids();
            assert!(narrow.ids().iter().all(|id| wide_ids.contains(id)));
        }
    }

    #[test]
    fn test_empty_catalog() {
        let snapshot = CatalogSnapshot::empty();
        assert!(apply(snapshot.products(), &FilterState::new().brand("x")).is_empty());
    }
}
