//! Search index provider trait definition.
//!
//! This module defines the abstract interface to the hosted search service,
//! allowing the delegates to be exercised against fake providers in tests.

use async_trait::async_trait;
use serde_json::Value;
use shelter_search_shared::FacetHit;

use crate::errors::SearchIndexError;
use crate::types::{FacetSearchRequest, IndexSettings, SearchRequest, SearchResponse};

/// Abstracts the hosted search service behind the index delegates.
///
/// Implementations are injected into `IndexDelegate` so that the delegates can
/// be tested with mock implementations. Every method addresses one index by
/// name; objects are JSON objects carrying their identifier as `objectID`.
///
/// Errors are returned as-is to the caller. Implementations must not retry.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Replace or create each object (upsert by `objectID`).
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    /// * `objects` - Full objects to write; an empty list is a no-op
    async fn save_objects(&self, index: &str, objects: Vec<Value>) -> Result<(), SearchIndexError>;

    /// Update only the attributes present in `object`.
    ///
    /// Attributes set to `null` are written as `null`; attributes absent from
    /// `object` are left untouched. Does not create missing objects.
    async fn partial_update_object(&self, index: &str, object: Value)
        -> Result<(), SearchIndexError>;

    /// Delete one object. Deleting a missing object is not an error.
    async fn delete_object(&self, index: &str, object_id: &str) -> Result<(), SearchIndexError>;

    /// Delete every object of the index, keeping its settings.
    async fn clear_objects(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Run a query and return one page of raw hits.
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchIndexError>;

    /// Search the values of a facet declared `searchable(...)`.
    async fn search_for_facet_values(
        &self,
        index: &str,
        facet: &str,
        request: &FacetSearchRequest,
    ) -> Result<Vec<FacetHit>, SearchIndexError>;

    /// Replace the index settings.
    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError>;
}
