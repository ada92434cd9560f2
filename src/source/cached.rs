// src/source/cached.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{snapshot_from_value, CatalogSource};
use crate::catalog::CatalogSnapshot;
use crate::error::{Error, ErrorSeverity, Result};
use crate::logging::Logger;

/// Wraps a source with a fetch timeout and a last-good snapshot.
///
/// A failed or slow fetch is served from the in-memory snapshot, then from
/// the cache file. The fetch only fails when neither exists.
#[derive(Debug)]
pub struct CachedCatalogSource<S> {
    inner: S,
    timeout: Duration,
    cache_path: Option<PathBuf>,
    last_good: RwLock<Option<CatalogSnapshot>>,
    logger: Logger,
}

impl<S: CatalogSource> CachedCatalogSource<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            cache_path: None,
            last_good: RwLock::new(None),
            logger: Logger::new("catalog_source"),
        }
    }

    pub fn with_cache_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn last_good(&self) -> Option<CatalogSnapshot> {
        self.last_good.read().clone()
    }

    async fn fallback(&self, cause: Error) -> Result<CatalogSnapshot> {
        self.logger.warn(format!(
            "Fetching from '{}' failed, serving last good catalog: {}",
            self.inner.name(),
            cause
        ));

        let cached = self.last_good.read().clone();
        if let Some(snapshot) = cached {
            return Ok(snapshot);
        }

        if let Some(path) = &self.cache_path {
            match read_cache(path).await {
                Ok(snapshot) => {
                    *self.last_good.write() = Some(snapshot.clone());
                    return Ok(snapshot);
                }
                Err(e) => self.logger.warn(format!(
                    "Catalog cache '{}' unusable: {}",
                    path.display(),
                    e
                )),
            }
        }

        Err(Error::catalog(
            self.inner.name(),
            "Catalog unavailable and no cached snapshot exists",
        )
        .severity(ErrorSeverity::High)
        .caused_by(cause))
    }
}

#[async_trait]
impl<S: CatalogSource> CatalogSource for CachedCatalogSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self) -> Result<CatalogSnapshot> {
        let fetched = match tokio::time::timeout(self.timeout, self.inner.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(format!(
                "Fetching from '{}' exceeded {:?}",
                self.inner.name(),
                self.timeout
            ))
            .source("catalog.fetch")),
        };

        match fetched {
            Ok(snapshot) => {
                *self.last_good.write() = Some(snapshot.clone());
                if let Some(path) = &self.cache_path {
                    if let Err(e) = write_cache(path, &snapshot).await {
                        self.logger.warn(format!(
                            "Failed to write catalog cache '{}': {}",
                            path.display(),
                            e
                        ));
                    }
                }
                Ok(snapshot)
            }
            Err(e) => self.fallback(e).await,
        }
    }
}

async fn read_cache(path: &Path) -> Result<CatalogSnapshot> {
    let content = tokio::fs::read_to_string(path).await?;
    snapshot_from_value(serde_json::from_str(&content)?)
}

async fn write_cache(path: &Path, snapshot: &CatalogSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string(&snapshot.to_document())?;
    tokio::fs::write(path, content).await?;
    Ok(())
}
