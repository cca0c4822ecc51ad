//! Search result types.
//!
//! This module defines the typed structures returned from search operations.

use serde::{Deserialize, Serialize};

/// A single search hit.
///
/// Contains the full indexed document along with the highlighted projection
/// of its searchable fields. Highlighted fields fall back to the raw value
/// when the search engine returned no highlight fragment for them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit<D, H> {
    /// The indexed document.
    pub document: D,

    /// Searchable fields with match markers embedded.
    pub highlighted: H,
}

/// One page of search hits along with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    /// The hits of the requested page, in ranking order.
    pub hits: Vec<T>,

    /// Total number of matching documents across all pages.
    pub hits_total_count: u64,

    /// Zero-based page index.
    pub page: u32,

    /// Total number of pages.
    pub page_count: u32,
}

impl<T> PaginatedResult<T> {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            hits_total_count: 0,
            page: 0,
            page_count: 0,
        }
    }

    /// Transform every hit, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            hits: self.hits.into_iter().map(f).collect(),
            hits_total_count: self.hits_total_count,
            page: self.page,
            page_count: self.page_count,
        }
    }

    /// Returns true if there are no hits on this page.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Returns the number of hits on this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }
}

/// A value of a searchable facet, as returned by facet-value search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetHit {
    /// The raw facet value.
    pub value: String,

    /// The facet value with match markers embedded.
    pub highlighted: String,

    /// Number of documents carrying this value.
    pub count: u64,
}
