//! Search index delegate implementation.
//!
//! This module provides the generic delegate application code uses to keep an
//! index synchronized with the system of record and to query it. One delegate
//! exists per indexed entity; the entity itself describes its index through
//! [`IndexedEntity`].

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shelter_search_shared::{PaginatedResult, SearchHit, WhereClause};
use tracing::{debug, info, instrument};

use crate::config::FetchConfig;
use crate::errors::SearchIndexError;
use crate::filters::build_filter_expression;
use crate::interfaces::SearchIndexProvider;
use crate::pagination::fetch_all;
use crate::types::{IndexSettings, SearchRequest, SearchResponse};
use crate::utils::highlight_projection;

/// Descriptor of an entity stored in its own search index.
pub trait IndexedEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Searchable fields of a hit, with match markers embedded.
    type Highlighted: DeserializeOwned + Send;

    /// Partial update of the entity.
    type Patch: Serialize + Send + Sync;

    /// Name of the index holding this entity.
    const INDEX_NAME: &'static str;

    /// Identifier of the entity, equal to its system-of-record primary key.
    fn id(&self) -> &str;

    /// Declarative settings of the index.
    fn settings() -> IndexSettings;
}

/// Paging options of [`IndexDelegate::find_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Zero-based page, only meaningful together with `hits_per_page`.
    pub page: Option<u32>,

    /// When set, exactly one page is requested. When unset, every matching
    /// hit is fetched.
    pub hits_per_page: Option<u32>,
}

impl SearchOptions {
    /// Request a single page.
    pub fn page(page: u32, hits_per_page: u32) -> Self {
        Self {
            page: Some(page),
            hits_per_page: Some(hits_per_page),
        }
    }
}

/// Typed access to the index of one entity.
///
/// Provider errors are propagated unchanged; nothing is retried here.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use shelter_search_repository::{AlgoliaConfig, AlgoliaProvider, FetchConfig, IndexDelegate};
/// use shelter_search_shared::{AnimalDocument, FilterValue, Species, WhereClause};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(AlgoliaProvider::new(AlgoliaConfig::from_env()?)?);
/// let animals: IndexDelegate<AnimalDocument> = IndexDelegate::new(provider, FetchConfig::default());
///
/// let clause = WhereClause::new().field("species", FilterValue::set([Species::Dog]));
/// let hits = animals.find_many("rex", &clause, Default::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct IndexDelegate<E: IndexedEntity> {
    provider: Arc<dyn SearchIndexProvider>,
    config: FetchConfig,
    entity: PhantomData<fn() -> E>,
}

impl<E: IndexedEntity> Clone for IndexDelegate<E> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
            entity: PhantomData,
        }
    }
}

impl<E: IndexedEntity> IndexDelegate<E> {
    pub fn new(provider: Arc<dyn SearchIndexProvider>, config: FetchConfig) -> Self {
        Self {
            provider,
            config,
            entity: PhantomData,
        }
    }

    /// Name of the underlying index.
    pub fn index_name(&self) -> &'static str {
        E::INDEX_NAME
    }

    fn to_object<T: Serialize>(value: &T) -> Result<Value, SearchIndexError> {
        Ok(serde_json::to_value(value)?)
    }

    /// Upsert one entity.
    #[instrument(skip(self, entity), fields(index = E::INDEX_NAME, id = entity.id()))]
    pub async fn create(&self, entity: &E) -> Result<(), SearchIndexError> {
        let object = Self::to_object(entity)?;
        self.provider.save_objects(E::INDEX_NAME, vec![object]).await
    }

    /// Upsert many entities, in provider batches of at most
    /// `write_batch_size` objects.
    ///
    /// An empty slice issues no request.
    #[instrument(skip(self, entities), fields(index = E::INDEX_NAME, count = entities.len()))]
    pub async fn create_many(&self, entities: &[E]) -> Result<(), SearchIndexError> {
        for batch in entities.chunks(self.config.write_batch_size.max(1)) {
            let objects = batch
                .iter()
                .map(Self::to_object)
                .collect::<Result<Vec<_>, _>>()?;
            self.provider.save_objects(E::INDEX_NAME, objects).await?;
            debug!(batch_size = batch.len(), "Batch saved");
        }
        Ok(())
    }

    /// Apply a partial update.
    ///
    /// Only the fields present in the patch are sent. Fields explicitly
    /// cleared in the patch are sent as `null`; the object must already exist.
    #[instrument(skip(self, patch), fields(index = E::INDEX_NAME))]
    pub async fn update(&self, patch: &E::Patch) -> Result<(), SearchIndexError> {
        let object = Self::to_object(patch)?;
        self.provider
            .partial_update_object(E::INDEX_NAME, object)
            .await
    }

    /// Delete one entity. Deleting a missing entity succeeds.
    #[instrument(skip(self), fields(index = E::INDEX_NAME))]
    pub async fn delete(&self, id: &str) -> Result<(), SearchIndexError> {
        self.provider.delete_object(E::INDEX_NAME, id).await
    }

    /// Remove every object of the index. Settings are kept.
    ///
    /// Only used by offline reindexing.
    #[instrument(skip(self), fields(index = E::INDEX_NAME))]
    pub async fn delete_all(&self) -> Result<(), SearchIndexError> {
        info!("Clearing index");
        self.provider.clear_objects(E::INDEX_NAME).await
    }

    /// Search the index.
    ///
    /// With `options.hits_per_page` set, exactly one request is issued and the
    /// hits of that page are returned. Otherwise every matching hit is
    /// fetched, in ranking order.
    ///
    /// # Arguments
    ///
    /// * `query` - Full-text query, empty to match everything
    /// * `where_clause` - Filters on facets
    /// * `options` - Paging options
    #[instrument(skip(self, where_clause), fields(index = E::INDEX_NAME))]
    pub async fn find_many(
        &self,
        query: &str,
        where_clause: &WhereClause,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit<E, E::Highlighted>>, SearchIndexError> {
        let request = SearchRequest::new(query, build_filter_expression(where_clause));

        let response = match options.hits_per_page {
            Some(hits_per_page) => {
                let page = options.page.unwrap_or(0);
                self.provider
                    .search(E::INDEX_NAME, &request.for_page(page, hits_per_page))
                    .await?
            }
            None => fetch_all(self.provider.as_ref(), E::INDEX_NAME, &request, &self.config).await?,
        };

        debug!(hits = response.hits.len(), nb_hits = response.nb_hits, "Search completed");
        Self::to_hits(response.hits)
    }

    /// Search one page of the index, along with pagination metadata.
    #[instrument(skip(self, where_clause), fields(index = E::INDEX_NAME))]
    pub async fn paginate(
        &self,
        query: &str,
        where_clause: &WhereClause,
        page: u32,
        hits_per_page: u32,
    ) -> Result<PaginatedResult<SearchHit<E, E::Highlighted>>, SearchIndexError> {
        let request = SearchRequest::new(query, build_filter_expression(where_clause))
            .for_page(page, hits_per_page);

        let SearchResponse {
            hits,
            nb_hits,
            page,
            nb_pages,
            ..
        } = self.provider.search(E::INDEX_NAME, &request).await?;

        Ok(PaginatedResult {
            hits: Self::to_hits(hits)?,
            hits_total_count: nb_hits,
            page,
            page_count: nb_pages,
        })
    }

    /// Declare searchable fields, facets and ranking. Replaces the previous
    /// settings of the index.
    #[instrument(skip(self), fields(index = E::INDEX_NAME))]
    pub async fn upload_settings(&self) -> Result<(), SearchIndexError> {
        self.provider
            .set_settings(E::INDEX_NAME, &E::settings())
            .await
    }

    fn to_hits(raw_hits: Vec<Value>) -> Result<Vec<SearchHit<E, E::Highlighted>>, SearchIndexError> {
        let settings = E::settings();
        let fields = settings.searchable_fields();

        raw_hits
            .into_iter()
            .map(|raw| {
                let highlighted = serde_json::from_value(highlight_projection(&raw, &fields))
                    .map_err(|e| SearchIndexError::parse(format!("Invalid highlight: {}", e)))?;
                let document = serde_json::from_value(raw)
                    .map_err(|e| SearchIndexError::parse(format!("Invalid hit: {}", e)))?;
                Ok(SearchHit {
                    document,
                    highlighted,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockProvider};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use shelter_search_shared::{
        AnimalDocument, AnimalHighlight, AnimalPatch, AnimalStatus, ColorDocument, FilterValue,
        Species, UserDocument, UserGroup,
    };

    fn animal(id: &str, name: &str) -> AnimalDocument {
        AnimalDocument {
            id: id.to_string(),
            alias: None,
            name: name.to_string(),
            pick_up_date: Utc.with_ymd_and_hms(2023, 4, 2, 0, 0, 0).unwrap(),
            pick_up_location: Some("Lyon".to_string()),
            species: Species::Dog,
            status: AnimalStatus::OpenToAdoption,
        }
    }

    fn raw_animal(id: &str, name: &str) -> Value {
        serde_json::to_value(animal(id, name)).unwrap()
    }

    fn delegate<E: IndexedEntity>(provider: &Arc<MockProvider>) -> IndexDelegate<E> {
        let provider: Arc<dyn SearchIndexProvider> = provider.clone();
        IndexDelegate::new(provider, FetchConfig::default())
    }

    #[tokio::test]
    async fn test_create_upserts_one_object() {
        let provider = Arc::new(MockProvider::new());
        let animals = delegate::<AnimalDocument>(&provider);

        animals.create(&animal("a", "Rex")).await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![Call::SaveObjects {
                index: "animals".to_string(),
                objects: vec![raw_animal("a", "Rex")],
            }]
        );
    }

    #[tokio::test]
    async fn test_create_many_is_batched() {
        let provider = Arc::new(MockProvider::new());
        let provider_dyn: Arc<dyn SearchIndexProvider> = provider.clone();
        let colors: IndexDelegate<ColorDocument> = IndexDelegate::new(
            provider_dyn,
            FetchConfig::default().with_write_batch_size(2),
        );

        let entities: Vec<ColorDocument> = ["black", "white", "tabby", "ginger", "grey"]
            .iter()
            .map(|name| ColorDocument {
                id: format!("color-{}", name),
                name: name.to_string(),
            })
            .collect();
        colors.create_many(&entities).await.unwrap();

        let batch_sizes: Vec<usize> = provider
            .calls()
            .into_iter()
            .map(|call| match call {
                Call::SaveObjects { index, objects } => {
                    assert_eq!(index, "colors");
                    objects.len()
                }
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert_eq!(batch_sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_create_many_accepts_empty_input() {
        let provider = Arc::new(MockProvider::new());
        let animals = delegate::<AnimalDocument>(&provider);

        animals.create_many(&[]).await.unwrap();

        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_only_patched_fields() {
        let provider = Arc::new(MockProvider::new());
        let animals = delegate::<AnimalDocument>(&provider);

        let patch = AnimalPatch {
            name: Some("X".to_string()),
            ..AnimalPatch::new("a")
        };
        animals.update(&patch).await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![Call::PartialUpdate {
                index: "animals".to_string(),
                object: json!({ "objectID": "a", "name": "X" }),
            }]
        );
    }

    #[tokio::test]
    async fn test_update_sends_explicit_clear() {
        let provider = Arc::new(MockProvider::new());
        let animals = delegate::<AnimalDocument>(&provider);

        let patch = AnimalPatch {
            alias: Some(None),
            ..AnimalPatch::new("a")
        };
        animals.update(&patch).await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![Call::PartialUpdate {
                index: "animals".to_string(),
                object: json!({ "objectID": "a", "alias": null }),
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let provider = Arc::new(MockProvider::new());
        let users = delegate::<UserDocument>(&provider);

        users.delete("user-1").await.unwrap();
        users.delete_all().await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![
                Call::Delete {
                    index: "users".to_string(),
                    object_id: "user-1".to_string(),
                },
                Call::Clear {
                    index: "users".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_settings() {
        let provider = Arc::new(MockProvider::new());
        let animals = delegate::<AnimalDocument>(&provider);

        animals.upload_settings().await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![Call::SetSettings {
                index: "animals".to_string(),
                settings: AnimalDocument::settings(),
            }]
        );
    }

    #[tokio::test]
    async fn test_find_many_with_page_size_issues_one_request() {
        let provider = Arc::new(MockProvider::with_pages(vec![
            vec![raw_animal("a", "Rex")],
            vec![raw_animal("b", "Max")],
        ]));
        let animals = delegate::<AnimalDocument>(&provider);

        let clause = WhereClause::new().field("species", FilterValue::set([Species::Dog]));
        let hits = animals
            .find_many("", &clause, SearchOptions::page(1, 1))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, "b");

        let requests = provider.search_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].page, Some(1));
        assert_eq!(requests[0].hits_per_page, Some(1));
        assert_eq!(requests[0].filters.as_deref(), Some("species:DOG"));
    }

    #[tokio::test]
    async fn test_find_many_without_page_size_fetches_everything() {
        let provider = Arc::new(MockProvider::with_pages(vec![
            vec![raw_animal("a", "Rex")],
            vec![raw_animal("b", "Max")],
            vec![raw_animal("c", "Oscar")],
        ]));
        let animals = delegate::<AnimalDocument>(&provider);

        let hits = animals
            .find_many("", &WhereClause::new(), SearchOptions::default())
            .await
            .unwrap();

        let ids: Vec<&str> = hits.iter().map(|hit| hit.document.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(provider.search_requests().len(), 3);
        assert_eq!(provider.search_requests()[0].filters, None);
    }

    #[tokio::test]
    async fn test_find_many_highlights_with_fallback() {
        let mut raw = raw_animal("a", "Rex");
        raw["alias"] = json!("Rexou");
        raw["_highlightResult"] = json!({
            "name": { "value": "<em>Re</em>x", "matchLevel": "full" }
        });
        let provider = Arc::new(MockProvider::with_pages(vec![vec![raw]]));
        let animals = delegate::<AnimalDocument>(&provider);

        let hits = animals
            .find_many("re", &WhereClause::new(), SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(
            hits[0].highlighted,
            AnimalHighlight {
                alias: Some("Rexou".to_string()),
                name: "<em>Re</em>x".to_string(),
            }
        );
        assert_eq!(hits[0].document.alias.as_deref(), Some("Rexou"));
        assert_eq!(hits[0].document.name, "Rex");
    }

    #[tokio::test]
    async fn test_find_many_rejects_malformed_hits() {
        let provider = Arc::new(MockProvider::with_pages(vec![vec![json!({
            "objectID": "a",
            "name": "Rex",
        })]]));
        let animals = delegate::<AnimalDocument>(&provider);

        let result = animals
            .find_many("", &WhereClause::new(), SearchOptions::default())
            .await;

        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_find_many_propagates_provider_errors() {
        let provider = Arc::new(MockProvider::with_pages(vec![vec![]]).failing_on_page(0));
        let animals = delegate::<AnimalDocument>(&provider);

        let result = animals
            .find_many("", &WhereClause::new(), SearchOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(SearchIndexError::RequestError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_paginate() {
        let user = |id: &str| {
            json!({
                "objectID": id,
                "displayName": "Jane",
                "groups": ["ADMIN"],
                "isDisabled": false,
            })
        };
        let provider = Arc::new(MockProvider::with_pages(vec![
            vec![user("u1"), user("u2")],
            vec![user("u3")],
        ]));
        let users = delegate::<UserDocument>(&provider);

        let clause = WhereClause::new().field("groups", FilterValue::set([UserGroup::Admin]));
        let result = users.paginate("", &clause, 1, 2).await.unwrap();

        assert_eq!(result.hits_total_count, 3);
        assert_eq!(result.page, 1);
        assert_eq!(result.page_count, 2);
        assert_eq!(result.len(), 1);
        assert_eq!(result.hits[0].document.id, "u3");
        assert_eq!(result.hits[0].highlighted.display_name, "Jane");
        assert_eq!(provider.search_requests()[0].filters.as_deref(), Some("groups:ADMIN"));
    }
}
