//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! from missing credentials at startup to failed provider requests.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and the index delegates. Provider
/// failures are propagated unchanged to the caller; nothing at this layer
/// retries or swallows them.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Missing or invalid provider configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to reach the search provider.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The search provider answered with a non-success status.
    #[error("Request failed with status {status}: {body}")]
    RequestError { status: u16, body: String },

    /// Failed to parse a response from the search provider.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a document or patch for the search provider.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Unknown error.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SearchIndexError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error from a response status and body.
    pub fn request(status: u16, body: impl Into<String>) -> Self {
        Self::RequestError {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create an unknown error.
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}

impl From<serde_json::Error> for SearchIndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
