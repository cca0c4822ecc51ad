//! Algolia settings bodies.
//!
//! Converts declarative [`IndexSettings`] into the JSON body of the
//! settings endpoint.

use serde_json::{json, Value};

use crate::types::{FacetAttribute, IndexSettings, Ranking};

fn facet_entry(facet: &FacetAttribute) -> String {
    match facet {
        FacetAttribute::Plain(name) => name.clone(),
        FacetAttribute::FilterOnly(name) => format!("filterOnly({})", name),
        FacetAttribute::Searchable(name) => format!("searchable({})", name),
    }
}

fn ranking_entry(ranking: &Ranking) -> String {
    match ranking {
        Ranking::Asc(name) => format!("asc({})", name),
        Ranking::Desc(name) => format!("desc({})", name),
    }
}

/// Build the body of a settings update.
///
/// Every key is always present so that uploading settings fully replaces the
/// previous configuration of the index.
pub fn settings_body(settings: &IndexSettings) -> Value {
    json!({
        "searchableAttributes": settings.searchable_attributes,
        "attributesForFaceting": settings
            .attributes_for_faceting
            .iter()
            .map(facet_entry)
            .collect::<Vec<_>>(),
        "customRanking": settings
            .custom_ranking
            .iter()
            .map(ranking_entry)
            .collect::<Vec<_>>(),
    })
}
