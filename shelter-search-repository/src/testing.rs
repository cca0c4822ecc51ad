//! In-memory provider used by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use shelter_search_shared::FacetHit;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{FacetSearchRequest, IndexSettings, SearchRequest, SearchResponse};

/// A provider call, as recorded by [`MockProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SaveObjects { index: String, objects: Vec<Value> },
    PartialUpdate { index: String, object: Value },
    Delete { index: String, object_id: String },
    Clear { index: String },
    Search { index: String, request: SearchRequest },
    FacetSearch { index: String, facet: String, request: FacetSearchRequest },
    SetSettings { index: String, settings: IndexSettings },
}

/// Serves pre-built pages of hits and records every call.
#[derive(Default)]
pub struct MockProvider {
    pages: Vec<Vec<Value>>,
    delays_ms: Vec<u64>,
    failing_page: Option<u32>,
    facet_hits: Vec<FacetHit>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// A raw hit carrying only its identifier.
pub fn hit(id: &str) -> Value {
    json!({ "objectID": id })
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(pages: Vec<Vec<Value>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Delay of each page request, indexed by page.
    pub fn with_delays(mut self, delays_ms: Vec<u64>) -> Self {
        self.delays_ms = delays_ms;
        self
    }

    pub fn failing_on_page(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn with_facet_hits(mut self, facet_hits: Vec<FacetHit>) -> Self {
        self.facet_hits = facet_hits;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search { request, .. } => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SearchIndexProvider for MockProvider {
    async fn save_objects(&self, index: &str, objects: Vec<Value>) -> Result<(), SearchIndexError> {
        self.record(Call::SaveObjects {
            index: index.to_string(),
            objects,
        });
        Ok(())
    }

    async fn partial_update_object(
        &self,
        index: &str,
        object: Value,
    ) -> Result<(), SearchIndexError> {
        self.record(Call::PartialUpdate {
            index: index.to_string(),
            object,
        });
        Ok(())
    }

    async fn delete_object(&self, index: &str, object_id: &str) -> Result<(), SearchIndexError> {
        self.record(Call::Delete {
            index: index.to_string(),
            object_id: object_id.to_string(),
        });
        Ok(())
    }

    async fn clear_objects(&self, index: &str) -> Result<(), SearchIndexError> {
        self.record(Call::Clear {
            index: index.to_string(),
        });
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchIndexError> {
        self.record(Call::Search {
            index: index.to_string(),
            request: request.clone(),
        });

        let page = request.page.unwrap_or(0);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = self.delays_ms.get(page as usize).copied().unwrap_or(0);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_page == Some(page) {
            return Err(SearchIndexError::request(500, "mock failure"));
        }

        Ok(SearchResponse {
            hits: self.pages.get(page as usize).cloned().unwrap_or_default(),
            nb_hits: self.pages.iter().map(|page| page.len() as u64).sum(),
            page,
            nb_pages: self.pages.len() as u32,
            hits_per_page: request.hits_per_page.unwrap_or(20),
        })
    }

    async fn search_for_facet_values(
        &self,
        index: &str,
        facet: &str,
        request: &FacetSearchRequest,
    ) -> Result<Vec<FacetHit>, SearchIndexError> {
        self.record(Call::FacetSearch {
            index: index.to_string(),
            facet: facet.to_string(),
            request: request.clone(),
        });
        Ok(self.facet_hits.clone())
    }

    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        self.record(Call::SetSettings {
            index: index.to_string(),
            settings: settings.clone(),
        });
        Ok(())
    }
}
