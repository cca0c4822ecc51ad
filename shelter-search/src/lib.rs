//! # Shelter Search
//!
//! Operator tooling for the search indexes of the shelter platform: uploads
//! index settings, rebuilds indexes from snapshots and replays write-through
//! change events.
//!
//! ## Architecture
//!
//! The tooling follows the Reader-Processor-Loader pattern:
//!
//! 1. **Orchestrator**: Reads input files and coordinates the flow
//! 2. **Processor**: Transforms raw change events into typed changes
//! 3. **Loader**: Writes changes through the index delegates
//!
//! ## Modules
//!
//! - [`cli`]: Command line interface
//! - [`config`]: Configuration and dependency initialization
//! - [`processor`]: Transforms change events into typed changes
//! - [`loader`]: Writes changes into the search indexes
//! - [`orchestrator`]: Coordinates the ingest flow
//! - [`errors`]: Error types for the ingest

pub mod cli;
pub mod config;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::Dependencies;
pub use errors::IngestError;

use thiserror::Error;

/// Errors that can occur during initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
