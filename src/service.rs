// src/service.rs

//! Request handling over a catalog source
//!
//! Each request gets its own correlation id. It is attached to the logger and
//! to any error that escapes, so one failed query can be traced through the
//! logs.

use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::query::{QueryEngine, QueryRequest, QueryResponse};
use crate::source::CatalogSource;
use crate::types::CorrelationId;

#[derive(Debug)]
pub struct StorefrontService<S> {
    source: S,
    engine: QueryEngine,
}

impl<S: CatalogSource> StorefrontService<S> {
    pub fn new(source: S, engine: QueryEngine) -> Self {
        Self { source, engine }
    }

    pub fn from_config(source: S, config: &StorefrontConfig) -> Self {
        Self::new(
            source,
            QueryEngine::new(config.query.clone(), config.vocabulary.clone()),
        )
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Validates the request, loads a snapshot and runs the query against it.
    /// Invalid requests never reach the source.
    pub async fn handle(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let correlation_id: CorrelationId = Uuid::new_v4();
        let logger = Logger::new("storefront_service").with_correlation_id(correlation_id);

        self.engine
            .validate(request)
            .map_err(|e| e.correlation_id(correlation_id))?;

        let snapshot = self.source.fetch().await.map_err(|e| {
            logger.error(format!("Catalog fetch failed: {}", e));
            e.correlation_id(correlation_id)
        })?;

        let response = self
            .engine
            .query(&snapshot, request)
            .map_err(|e| e.correlation_id(correlation_id))?;

        logger.debug(format!(
            "{} query over {} products matched {}",
            request.mode,
            snapshot.len(),
            response.total_count
        ));
        Ok(response)
    }
}
