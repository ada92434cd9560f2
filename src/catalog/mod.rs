// src/catalog/mod.rs

//! Product records and the immutable catalog snapshot queries run against.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ProductId;

/// One sellable item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    /// Color identifiers of the available variants
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    /// Product-type tags (e.g. "sneakers", "maxi")
    #[serde(default)]
    pub types: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub description: String,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn colors<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn sizes<I, S>(mut self, sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// On-disk shape of a catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub products: Vec<Product>,
}

/// Immutable, fully materialized view of the catalog for one or more queries.
///
/// Cloning is cheap; the product list is shared.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    products: Arc<[Product]>,
    taken_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Builds a snapshot, rejecting duplicate ids and invalid prices.
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id.as_str()) {
                return Err(Error::catalog(
                    "snapshot",
                    format!("Duplicate product id '{}'", product.id),
                ));
            }
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(Error::catalog(
                    "snapshot",
                    format!(
                        "Product '{}' has invalid price {}",
                        product.id, product.price
                    ),
                ));
            }
        }

        Ok(Self {
            products: products.into(),
            taken_at: Utc::now(),
        })
    }

    pub fn empty() -> Self {
        Self {
            products: Vec::new().into(),
            taken_at: Utc::now(),
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            products: self.products.to_vec(),
        }
    }
}

impl TryFrom<CatalogDocument> for CatalogSnapshot {
    type Error = Error;

    fn try_from(document: CatalogDocument) -> Result<Self> {
        Self::new(document.products)
    }
}
