// src/source/mod.rs

//! Catalog sources
//!
//! A source produces the [`CatalogSnapshot`] a query runs against. Sources
//! own loading and caching; the query engine only ever sees a finished
//! snapshot.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::{CatalogDocument, CatalogSnapshot, Product};
use crate::config::{CatalogConfig, ConfigFormat};
use crate::error::{Error, Result};

mod cached;

pub use cached::CachedCatalogSource;

#[async_trait]
pub trait CatalogSource: Send + Sync + std::fmt::Debug {
    /// Identifier used in logs and errors
    fn name(&self) -> &str;

    /// Loads a complete, validated snapshot
    async fn fetch(&self) -> Result<CatalogSnapshot>;
}

/// Reads a catalog document from disk on every fetch
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    name: String,
    path: PathBuf,
    format: ConfigFormat,
}

impl FileCatalogSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = format!("file:{}", path.display());
        let format = ConfigFormat::from_extension(&path).ok_or_else(|| {
            Error::catalog(
                name.clone(),
                "Catalog file must have a .json, .yaml, .yml or .toml extension",
            )
        })?;
        Ok(Self { name, path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<CatalogSnapshot> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::catalog(self.name.clone(), format!("Failed to read catalog: {}", e))
                .caused_by(e)
        })?;

        let value = self.format.parse(&content).map_err(|e| {
            Error::catalog(self.name.clone(), "Catalog document is malformed").caused_by(e)
        })?;
        let snapshot = snapshot_from_value(value).map_err(|e| {
            Error::catalog(self.name.clone(), "Catalog document is invalid").caused_by(e)
        })?;

        tracing::info!(source = %self.name, products = snapshot.len(), "catalog loaded");
        Ok(snapshot)
    }
}

/// Serves a fixed product list
#[derive(Debug, Clone)]
pub struct InMemoryCatalogSource {
    snapshot: CatalogSnapshot,
}

impl InMemoryCatalogSource {
    pub fn new(products: Vec<Product>) -> Result<Self> {
        Ok(Self {
            snapshot: CatalogSnapshot::new(products)?,
        })
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self) -> Result<CatalogSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Accepts `{ "products": [...] }` or a bare product array.
pub(crate) fn snapshot_from_value(value: Value) -> Result<CatalogSnapshot> {
    let products: Vec<Product> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        other => serde_json::from_value::<CatalogDocument>(other)?.products,
    };
    CatalogSnapshot::new(products)
}

/// File source wrapped with timeout and last-good fallback, per `config`
pub fn source_from_config(config: &CatalogConfig) -> Result<CachedCatalogSource<FileCatalogSource>> {
    let path = config
        .path
        .as_ref()
        .ok_or_else(|| Error::config("catalog.path is not set"))?;
    let source = CachedCatalogSource::new(
        FileCatalogSource::new(path)?,
        Duration::from_millis(config.fetch_timeout_ms),
    );
    Ok(match &config.cache_path {
        Some(cache_path) => source.with_cache_path(cache_path),
        None => source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mock::generate_catalog;
    use std::io::Write;
    use tempfile::Builder;

    #[tokio::test]
    async fn test_json_document_source() {
        let document = CatalogDocument {
            products: generate_catalog(10, 1),
        };
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&document).unwrap().as_bytes())
            .unwrap();

        let source = FileCatalogSource::new(file.path()).unwrap();
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot.products(), document.products.as_slice());
    }

    #[tokio::test]
    async fn test_bare_array_and_yaml() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            b"- id: a\n  name: Tote\n  brand: Mango\n  category: accessories/bags\n  colors: [beige]\n  sizes: [one-size]\n  price: 39.5\n",
        )
        .unwrap();

        let snapshot = FileCatalogSource::new(file.path())
            .unwrap()
            .fetch()
            .await
            .unwrap();
        assert_eq!(snapshot.get("a").unwrap().brand, "Mango");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCatalogSource::new(dir.path().join("absent.json")).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Catalog { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(
            br#"[{"id":"1","name":"a","brand":"b","category":"c","colors":[],"sizes":[],"price":1},
                {"id":"1","name":"a","brand":"b","category":"c","colors":[],"sizes":[],"price":1}]"#,
        )
        .unwrap();
        let err = FileCatalogSource::new(file.path())
            .unwrap()
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Catalog { .. }));
        assert!(!err.causes.is_empty());
    }

    #[test]
    fn test_unknown_extension() {
        assert!(FileCatalogSource::new("catalog.csv").is_err());
    }

    #[test]
    fn test_source_from_config_requires_path() {
        assert!(source_from_config(&CatalogConfig::default()).is_err());

        let config = CatalogConfig {
            path: Some(PathBuf::from("catalog.json")),
            ..CatalogConfig::default()
        };
        let source = source_from_config(&config).unwrap();
        assert_eq!(source.name(), "file:catalog.json");
    }

    #[test]
    fn test_in_memory_source() {
        let source = InMemoryCatalogSource::new(generate_catalog(3, 9)).unwrap();
        let snapshot = tokio_test::block_on(source.fetch()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(source.name(), "memory");
    }
}
