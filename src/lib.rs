// src/lib.rs

//! Storefront Facets - catalog filtering, faceting and pagination for a
//! product listing page

#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::result_large_err)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod facets;
pub mod filter;
pub mod logging;
pub mod mock;
pub mod paginate;
pub mod query;
pub mod service;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogSnapshot, Product};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use facets::{FacetScope, FacetSet, Vocabulary};
pub use filter::{apply, Dimension, FilterState, PriceRange};
pub use paginate::{paginate, PagingMetadata};
pub use query::{query, QueryEngine, QueryMode, QueryRequest, QueryResponse};
pub use service::StorefrontService;
pub use source::CatalogSource;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
