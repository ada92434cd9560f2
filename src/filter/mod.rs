// src/filter/mod.rs

//! Filter requests and the engine that applies them to a catalog
//!
//! A [`FilterState`] is the caller's selection across the seven filterable
//! dimensions. An absent or empty dimension imposes no constraint; active
//! dimensions are combined with AND, values inside a multi-select dimension
//! with OR.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

mod engine;
mod params;
mod predicate;

pub use engine::{apply, FilteredSet};
pub use params::ParamError;
pub use predicate::{matches, CompiledFilter};

/// Inclusive price bounds, `[min, max]` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }

    pub fn validate(&self) -> Result<()> {
        if self.min.is_nan() || self.max.is_nan() {
            return Err(Error::validation(
                "priceRange",
                "Price bounds must be numbers",
            ));
        }
        if self.min < 0.0 || self.max < 0.0 {
            return Err(Error::validation(
                "priceRange",
                format!(
                    "Price bounds must not be negative, got [{}, {}]",
                    self.min, self.max
                ),
            ));
        }
        if self.min > self.max {
            return Err(Error::validation(
                "priceRange",
                format!(
                    "Minimum price {} exceeds maximum price {}",
                    self.min, self.max
                ),
            )
            .metadata("min", serde_json::json!(self.min))
            .metadata("max", serde_json::json!(self.max)));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for PriceRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

impl From<PriceRange> for (f64, f64) {
    fn from(range: PriceRange) -> Self {
        (range.min, range.max)
    }
}

/// A filterable product dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Category,
    Brands,
    Colors,
    Sizes,
    Types,
    Styles,
    Occasions,
    PriceRange,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Category,
        Dimension::Brands,
        Dimension::Colors,
        Dimension::Sizes,
        Dimension::Types,
        Dimension::Styles,
        Dimension::Occasions,
        Dimension::PriceRange,
    ];

    /// Request/response field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Brands => "brands",
            Self::Colors => "colors",
            Self::Sizes => "sizes",
            Self::Types => "types",
            Self::Styles => "styles",
            Self::Occasions => "occasions",
            Self::PriceRange => "priceRange",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small bitset of dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DimensionSet(u16);

impl DimensionSet {
    pub const EMPTY: DimensionSet = DimensionSet(0);

    pub fn insert(&mut self, dimension: Dimension) {
        self.0 |= dimension.bit();
    }

    pub fn contains(&self, dimension: Dimension) -> bool {
        self.0 & dimension.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// The single member, if there is exactly one
    pub fn only(&self) -> Option<Dimension> {
        if self.len() != 1 {
            return None;
        }
        Dimension::ALL.into_iter().find(|d| self.contains(*d))
    }

    pub fn iter(&self) -> impl Iterator<Item = Dimension> + '_ {
        Dimension::ALL.into_iter().filter(|d| self.contains(*d))
    }
}

impl FromIterator<Dimension> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        let mut set = DimensionSet::EMPTY;
        for dimension in iter {
            set.insert(dimension);
        }
        set
    }
}

/// The caller's selection across all filterable dimensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Case-insensitive substring of the product category
    pub category: Option<String>,
    pub brands: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub types: Vec<String>,
    /// Terms searched for in product descriptions
    pub styles: Vec<String>,
    /// Terms searched for in product descriptions
    pub occasions: Vec<String>,
    pub price_range: Option<PriceRange>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the storefront's URL query-string form, e.g.
    /// `category=women&brands=Nike,Adidas&priceRange=20-50`.
    pub fn from_query_string(qs: &str) -> Result<Self> {
        let filter = params::parse(qs)?;
        filter.validate()?;
        Ok(filter)
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brands.push(brand.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.colors.push(color.into());
        self
    }

    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.sizes.push(size.into());
        self
    }

    pub fn product_type(mut self, product_type: impl Into<String>) -> Self {
        self.types.push(product_type.into());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.styles.push(style.into());
        self
    }

    pub fn occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasions.push(occasion.into());
        self
    }

    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some(PriceRange::new(min, max));
        self
    }

    /// Rejects malformed input before any filtering runs
    pub fn validate(&self) -> Result<()> {
        if let Some(range) = &self.price_range {
            range.validate()?;
        }
        Ok(())
    }

    pub fn is_active(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Category => self
                .category
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty()),
            Dimension::Brands => has_values(&self.brands),
            Dimension::Colors => has_values(&self.colors),
            Dimension::Sizes => has_values(&self.sizes),
            Dimension::Types => has_values(&self.types),
            Dimension::Styles => has_values(&self.styles),
            Dimension::Occasions => has_values(&self.occasions),
            Dimension::PriceRange => self.price_range.is_some(),
        }
    }

    pub fn active_dimensions(&self) -> DimensionSet {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.is_active(*d))
            .collect()
    }

    /// Identity filter: no dimension constrains anything
    pub fn is_empty(&self) -> bool {
        self.active_dimensions().is_empty()
    }

    /// Copy of this filter with one dimension cleared
    pub fn without(&self, dimension: Dimension) -> Self {
        let mut filter = self.clone();
        match dimension {
            Dimension::Category => filter.category = None,
            Dimension::Brands => filter.brands.clear(),
            Dimension::Colors => filter.colors.clear(),
            Dimension::Sizes => filter.sizes.clear(),
            Dimension::Types => filter.types.clear(),
            Dimension::Styles => filter.styles.clear(),
            Dimension::Occasions => filter.occasions.clear(),
            Dimension::PriceRange => filter.price_range = None,
        }
        filter
    }
}

fn has_values(values: &[String]) -> bool {
    values.iter().any(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_inverted_price_range() {
        let filter = FilterState::new().price_range(5.0, 1.0);
        let err = filter.validate().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("priceRange"));
    }

    #[test]
    fn test_validate_rejects_negative_bounds() {
        for (min, max) in [(-10.0, 50.0), (-5.0, -1.0), (0.0, -0.5)] {
            let err = FilterState::new().price_range(min, max).validate().unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.field(), Some("priceRange"));
        }
        assert!(FilterState::new().price_range(0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_point_range_and_absent_range() {
        assert!(FilterState::new().price_range(10.0, 10.0).validate().is_ok());
        assert!(FilterState::new().validate().is_ok());
        assert!(FilterState::new()
            .price_range(f64::NAN, 10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_active_dimensions() {
        let filter = FilterState::new()
            .brand("Nike")
            .color("red")
            .category("  ")
            .price_range(0.0, 10.0);
        let active = filter.active_dimensions();
        assert_eq!(active.len(), 3);
        assert!(active.contains(Dimension::Brands));
        assert!(active.contains(Dimension::PriceRange));
        assert!(!active.contains(Dimension::Category));
        assert!(FilterState::new().is_empty());
    }

    #[test]
    fn test_without_clears_only_that_dimension() {
        let filter = FilterState::new().brand("Nike").color("red");
        let relaxed = filter.without(Dimension::Colors);
        assert!(relaxed.colors.is_empty());
        assert_eq!(relaxed.brands, vec!["Nike".to_string()]);
    }

    #[test]
    fn test_dimension_set_only() {
        let mut set = DimensionSet::EMPTY;
        assert_eq!(set.only(), None);
        set.insert(Dimension::Sizes);
        assert_eq!(set.only(), Some(Dimension::Sizes));
        set.insert(Dimension::Types);
        assert_eq!(set.only(), None);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Dimension::Sizes, Dimension::Types]
        );
    }

    #[test]
    fn test_filter_state_json_shape() {
        let filter: FilterState =
            serde_json::from_str(r#"{"brands":["Nike"],"priceRange":[20,50]}"#).unwrap();
        assert_eq!(filter.brands, vec!["Nike".to_string()]);
        assert_eq!(filter.price_range, Some(PriceRange::new(20.0, 50.0)));

        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(value["priceRange"], serde_json::json!([20.0, 50.0]));
    }
}
