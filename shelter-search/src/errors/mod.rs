//! Error types for the shelter search ingest.

use shelter_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while loading records into the search indexes.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(#[from] SearchIndexError),

    /// Error parsing or decoding input data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error reading input files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IngestError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a parse error located at a line of the input.
    pub fn parse_at(line: usize, msg: impl std::fmt::Display) -> Self {
        Self::ParseError(format!("line {}: {}", line, msg))
    }
}
