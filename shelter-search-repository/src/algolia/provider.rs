//! Algolia provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! on top of the Algolia REST API, using `reqwest`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use shelter_search_shared::FacetHit;
use tracing::{debug, error, info};
use url::{form_urlencoded, Url};

use crate::algolia::index_settings::settings_body;
use crate::config::AlgoliaConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{FacetSearchRequest, IndexSettings, SearchRequest, SearchResponse};

const APPLICATION_ID_HEADER: &str = "x-algolia-application-id";
const API_KEY_HEADER: &str = "x-algolia-api-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacetSearchResponse {
    #[serde(default)]
    facet_hits: Vec<FacetHit>,
}

/// Algolia provider implementation.
///
/// Reads go to the DSN host, writes to the primary host, unless the
/// configuration overrides the host.
///
/// # Example
///
/// ```no_run
/// use shelter_search_repository::{AlgoliaConfig, AlgoliaProvider};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AlgoliaConfig::from_env()?;
/// let provider = AlgoliaProvider::new(config)?;
/// # Ok(())
/// # }
/// ```
pub struct AlgoliaProvider {
    client: Client,
    read_url: Url,
    write_url: Url,
}

impl AlgoliaProvider {
    /// Create a new provider authenticated with the configured credentials.
    ///
    /// # Returns
    ///
    /// * `Ok(AlgoliaProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the credentials or host are unusable
    pub fn new(config: AlgoliaConfig) -> Result<Self, SearchIndexError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            APPLICATION_ID_HEADER,
            HeaderValue::from_str(&config.application_id).map_err(|e| {
                SearchIndexError::configuration(format!("Invalid application ID: {}", e))
            })?,
        );
        let mut api_key = HeaderValue::from_str(&config.admin_api_key)
            .map_err(|e| SearchIndexError::configuration(format!("Invalid API key: {}", e)))?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let (read_base, write_base) = match &config.host {
            Some(host) => (host.clone(), host.clone()),
            None => (
                format!("https://{}-dsn.algolia.net", config.application_id),
                format!("https://{}.algolia.net", config.application_id),
            ),
        };
        let read_url = Self::parse_base_url(&read_base)?;
        let write_url = Self::parse_base_url(&write_base)?;

        info!(
            application_id = %config.application_id,
            read_url = %read_url,
            write_url = %write_url,
            "Created Algolia provider"
        );

        Ok(Self {
            client,
            read_url,
            write_url,
        })
    }

    fn parse_base_url(base: &str) -> Result<Url, SearchIndexError> {
        let url = Url::parse(base)
            .map_err(|e| SearchIndexError::configuration(format!("Invalid host {}: {}", base, e)))?;
        if url.cannot_be_a_base() {
            return Err(SearchIndexError::configuration(format!(
                "Invalid host {}: not a base URL",
                base
            )));
        }
        Ok(url)
    }

    /// Build `{base}/1/indexes/{index}/{segments...}` with each segment
    /// percent-encoded.
    fn index_url(base: &Url, index: &str, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["1", "indexes", index])
                .extend(segments);
        }
        url
    }

    /// Send a request and turn non-success statuses into errors.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, SearchIndexError> {
        let response = request
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Algolia request failed");
            return Err(SearchIndexError::request(status.as_u16(), body));
        }

        Ok(response)
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, SearchIndexError> {
        response
            .json::<T>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    fn object_id(object: &Value) -> Result<&str, SearchIndexError> {
        object
            .get("objectID")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchIndexError::serialization("Object has no objectID"))
    }

    fn batch_body(objects: Vec<Value>) -> Value {
        let requests: Vec<Value> = objects
            .into_iter()
            .map(|object| json!({ "action": "updateObject", "body": object }))
            .collect();
        json!({ "requests": requests })
    }

    /// Body of a facet value search. The endpoint only reads filters from the
    /// URL-encoded `params` string.
    fn facet_search_body(request: &FacetSearchRequest) -> Value {
        let mut body = json!({ "facetQuery": request.facet_query });

        if let Some(max_facet_hits) = request.max_facet_hits {
            body["maxFacetHits"] = json!(max_facet_hits);
        }
        if let Some(filters) = &request.filters {
            let params = form_urlencoded::Serializer::new(String::new())
                .append_pair("filters", filters)
                .finish();
            body["params"] = Value::String(params);
        }

        body
    }
}

#[async_trait]
impl SearchIndexProvider for AlgoliaProvider {
    async fn save_objects(&self, index: &str, objects: Vec<Value>) -> Result<(), SearchIndexError> {
        if objects.is_empty() {
            return Ok(());
        }

        let count = objects.len();
        let url = Self::index_url(&self.write_url, index, &["batch"]);
        self.execute(self.client.post(url).json(&Self::batch_body(objects)))
            .await?;

        debug!(index = %index, count = count, "Objects saved");
        Ok(())
    }

    async fn partial_update_object(
        &self,
        index: &str,
        object: Value,
    ) -> Result<(), SearchIndexError> {
        let object_id = Self::object_id(&object)?.to_string();

        let mut url = Self::index_url(&self.write_url, index, &[&object_id, "partial"]);
        url.query_pairs_mut()
            .append_pair("createIfNotExists", "false");

        self.execute(self.client.post(url).json(&object)).await?;

        debug!(index = %index, object_id = %object_id, "Object partially updated");
        Ok(())
    }

    async fn delete_object(&self, index: &str, object_id: &str) -> Result<(), SearchIndexError> {
        let url = Self::index_url(&self.write_url, index, &[object_id]);

        match self.execute(self.client.delete(url)).await {
            Ok(_) => {}
            // The object may already be gone.
            Err(SearchIndexError::RequestError { status: 404, .. }) => {}
            Err(e) => return Err(e),
        }

        debug!(index = %index, object_id = %object_id, "Object deleted");
        Ok(())
    }

    async fn clear_objects(&self, index: &str) -> Result<(), SearchIndexError> {
        let url = Self::index_url(&self.write_url, index, &["clear"]);
        self.execute(self.client.post(url)).await?;

        info!(index = %index, "Index cleared");
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchIndexError> {
        let url = Self::index_url(&self.read_url, index, &["query"]);
        let response = self.execute(self.client.post(url).json(request)).await?;
        Self::parse_json(response).await
    }

    async fn search_for_facet_values(
        &self,
        index: &str,
        facet: &str,
        request: &FacetSearchRequest,
    ) -> Result<Vec<FacetHit>, SearchIndexError> {
        let url = Self::index_url(&self.read_url, index, &["facets", facet, "query"]);
        let body = Self::facet_search_body(request);
        let response = self.execute(self.client.post(url).json(&body)).await?;
        let body: FacetSearchResponse = Self::parse_json(response).await?;
        Ok(body.facet_hits)
    }

    async fn set_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        let url = Self::index_url(&self.write_url, index, &["settings"]);
        self.execute(self.client.put(url).json(&settings_body(settings)))
            .await?;

        info!(index = %index, "Index settings uploaded");
        Ok(())
    }
}
