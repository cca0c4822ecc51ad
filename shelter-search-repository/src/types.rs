//! Request, response and settings types for search index operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search call against an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Full-text query. Empty matches every object.
    pub query: String,

    /// Compiled filter expression. Omitted when nothing is filtered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,

    /// Zero-based page index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Number of hits per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<u32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, filters: Option<String>) -> Self {
        Self {
            query: query.into(),
            filters,
            page: None,
            hits_per_page: None,
        }
    }

    /// Copy of this request targeting a specific page.
    pub fn for_page(&self, page: u32, hits_per_page: u32) -> Self {
        Self {
            page: Some(page),
            hits_per_page: Some(hits_per_page),
            ..self.clone()
        }
    }
}

/// One page of raw hits as returned by the provider.
///
/// Each hit is the stored object plus provider metadata such as
/// `_highlightResult`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default)]
    pub nb_hits: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub nb_pages: u32,
    #[serde(default)]
    pub hits_per_page: u32,
}

/// Search over the values of one facet.
///
/// The provider decides the wire shape; Algolia expects the filters inside
/// a URL-encoded `params` string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSearchRequest {
    /// Text the facet values are matched against.
    pub facet_query: String,

    /// Compiled filter expression restricting the counted objects.
    pub filters: Option<String>,

    pub max_facet_hits: Option<u32>,
}

/// How an attribute can be used for faceted filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetAttribute {
    /// Filterable and counted in facet results.
    Plain(String),
    /// Filterable only, no facet counts.
    FilterOnly(String),
    /// Filterable and its values are searchable.
    Searchable(String),
}

impl FacetAttribute {
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(name) | Self::FilterOnly(name) | Self::Searchable(name) => name,
        }
    }
}

/// Custom ranking tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ranking {
    Asc(String),
    Desc(String),
}

/// Declarative settings of one index.
///
/// Uploading settings replaces whatever the index had before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSettings {
    /// Searchable attributes, highest priority first. Attributes sharing a
    /// priority are comma-separated in one entry (`"alias,name"`).
    pub searchable_attributes: Vec<String>,
    pub attributes_for_faceting: Vec<FacetAttribute>,
    pub custom_ranking: Vec<Ranking>,
}

impl IndexSettings {
    pub fn new<I, S>(searchable_attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            searchable_attributes: searchable_attributes.into_iter().map(Into::into).collect(),
            attributes_for_faceting: Vec::new(),
            custom_ranking: Vec::new(),
        }
    }

    pub fn with_facet(mut self, facet: FacetAttribute) -> Self {
        self.attributes_for_faceting.push(facet);
        self
    }

    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.custom_ranking.push(ranking);
        self
    }

    /// Names of every searchable attribute, in priority order.
    ///
    /// Strips modifiers such as `unordered(...)`.
    pub fn searchable_fields(&self) -> Vec<&str> {
        self.searchable_attributes
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(|field| {
                let field = field.trim();
                field
                    .strip_prefix("unordered(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .unwrap_or(field)
            })
            .filter(|field| !field.is_empty())
            .collect()
    }
}
