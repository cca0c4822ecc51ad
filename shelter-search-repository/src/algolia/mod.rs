//! Algolia implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using Algolia's REST API as the backend.

mod index_settings;
mod provider;

pub use index_settings::settings_body;
pub use provider::AlgoliaProvider;
