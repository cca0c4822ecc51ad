//! # Shelter Search Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search indexes of the shelter platform. It includes definitions for errors,
//! interfaces, the filter expression builder, the paginated fetcher, the
//! per-entity delegates, and a concrete implementation for Algolia.

pub mod algolia;
pub mod config;
pub mod delegate;
pub mod entities;
pub mod errors;
pub mod filters;
pub mod interfaces;
pub mod pagination;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

pub use algolia::AlgoliaProvider;
pub use config::{AlgoliaConfig, FetchConfig};
pub use delegate::{IndexDelegate, IndexedEntity, SearchOptions};
pub use entities::{PickUpLocationDelegate, SearchIndexes};
pub use errors::SearchIndexError;
pub use filters::build_filter_expression;
pub use interfaces::SearchIndexProvider;
pub use pagination::fetch_all;
pub use types::{
    FacetAttribute, FacetSearchRequest, IndexSettings, Ranking, SearchRequest, SearchResponse,
};
pub use utils::highlight_projection;
