// src/query.rs

//! Query orchestration
//!
//! Every query validates its input, filters the snapshot exactly once, and
//! then feeds the same filtered set to the paginator, the facet engine, or
//! both, depending on the requested [`QueryMode`].

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSnapshot, Product};
use crate::config::QueryConfig;
use crate::error::{Error, Result};
use crate::facets::{compute_facets, compute_facets_excluding_own, FacetScope, FacetSet, Vocabulary};
use crate::filter::{apply, FilterState};
use crate::paginate::{paginate, validate_paging, PagingMetadata};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// One page of products with paging metadata
    Products,
    /// Facets over the whole filtered set
    Facets,
    #[default]
    Combined,
}

impl QueryMode {
    pub fn includes_products(&self) -> bool {
        matches!(self, Self::Products | Self::Combined)
    }

    pub fn includes_facets(&self) -> bool {
        matches!(self, Self::Facets | Self::Combined)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Facets => "facets",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" => Ok(Self::Products),
            "facets" | "filters" => Ok(Self::Facets),
            "combined" | "all" => Ok(Self::Combined),
            other => Err(Error::validation(
                "mode",
                format!("Unknown query mode '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub filter: FilterState,
    pub page: usize,
    pub page_size: usize,
    #[serde(default)]
    pub mode: QueryMode,
}

impl QueryRequest {
    pub fn new(filter: FilterState) -> Self {
        Self {
            filter,
            page: 1,
            page_size: QueryConfig::default().default_page_size,
            mode: QueryMode::Combined,
        }
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// The requested page; empty in facets mode
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<FacetSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingMetadata>,
    /// Size of the whole filtered set
    pub total_count: usize,
}

/// Stateless query entry point; safe to share across threads
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    config: QueryConfig,
    vocabulary: Vocabulary,
}

impl QueryEngine {
    pub fn new(config: QueryConfig, vocabulary: Vocabulary) -> Self {
        Self { config, vocabulary }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Rejects a malformed request. Nothing is computed for a request that
    /// fails here.
    pub fn validate(&self, request: &QueryRequest) -> Result<()> {
        request.filter.validate()?;
        validate_paging(request.page, request.page_size)?;
        if request.page_size > self.config.max_page_size {
            return Err(Error::validation(
                "pageSize",
                format!(
                    "Page size {} exceeds the maximum of {}",
                    request.page_size, self.config.max_page_size
                ),
            ));
        }
        Ok(())
    }

    pub fn query(&self, catalog: &CatalogSnapshot, request: &QueryRequest) -> Result<QueryResponse> {
        self.validate(request)?;

        let span = tracing::debug_span!(
            "query",
            mode = %request.mode,
            catalog_size = catalog.len()
        );
        let _enter = span.enter();
        let started = Instant::now();

        let filtered = apply(catalog.products(), &request.filter);

        let (products, paging) = if request.mode.includes_products() {
            let (page, metadata) = paginate(filtered.as_slice(), request.page, request.page_size)?;
            (page.iter().map(|p| (*p).clone()).collect(), Some(metadata))
        } else {
            (Vec::new(), None)
        };

        let facets = request.mode.includes_facets().then(|| match self.config.facet_scope {
            FacetScope::FullyFiltered => compute_facets(
                filtered.iter(),
                &self.vocabulary,
                self.config.default_price_range,
            ),
            FacetScope::ExcludeOwnDimension => compute_facets_excluding_own(
                catalog.products(),
                &request.filter,
                &self.vocabulary,
                self.config.default_price_range,
            ),
        });

        tracing::debug!(
            matched = filtered.len(),
            returned = products.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "query complete"
        );

        Ok(QueryResponse {
            products,
            facets,
            paging,
            total_count: filtered.len(),
        })
    }
}

/// Runs one query with the default configuration and vocabulary.
pub fn query(
    catalog: &CatalogSnapshot,
    filter: FilterState,
    page: usize,
    page_size: usize,
    mode: QueryMode,
) -> Result<QueryResponse> {
    let request = QueryRequest {
        filter,
        page,
        page_size,
        mode,
    };
    QueryEngine::default().query(catalog, &request)
}
