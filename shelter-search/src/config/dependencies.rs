//! Dependency initialization and wiring for the shelter search tooling.

use std::sync::Arc;

use tracing::info;

use crate::loader::{LoaderConfig, SearchLoader};
use crate::orchestrator::Orchestrator;
use crate::processor::ChangeProcessor;
use crate::IndexingError;
use shelter_search_repository::{
    AlgoliaConfig, AlgoliaProvider, FetchConfig, SearchIndexProvider, SearchIndexes,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// Fails when the provider credentials are missing, before any command
    /// runs.
    ///
    /// # Environment Variables
    ///
    /// - `ALGOLIA_APP_ID`: provider application ID (required)
    /// - `ALGOLIA_ADMIN_KEY`: provider admin API key (required)
    /// - `ALGOLIA_HOST`: base URL override (optional)
    /// - `SEARCH_FETCH_PAGE_SIZE`: hits per page when fetching every hit (default: 1000)
    /// - `SEARCH_MAX_CONCURRENT_REQUESTS`: concurrent page requests (default: 10)
    /// - `SEARCH_WRITE_BATCH_SIZE`: objects per write batch (default: 1000)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration is missing or invalid
    pub fn new() -> Result<Self, IndexingError> {
        let algolia_config = AlgoliaConfig::from_env()
            .map_err(|e| IndexingError::config(e.to_string()))?;
        let fetch_config = FetchConfig::from_env();

        info!(
            algolia = ?algolia_config,
            page_size = fetch_config.page_size,
            max_concurrent_requests = fetch_config.max_concurrent_requests,
            write_batch_size = fetch_config.write_batch_size,
            "Initializing dependencies"
        );

        let provider = AlgoliaProvider::new(algolia_config).map_err(|e| {
            IndexingError::config(format!("Failed to create Algolia provider: {}", e))
        })?;

        Ok(Self::with_provider(Arc::new(provider), fetch_config))
    }

    /// Wire the components around an existing provider.
    pub fn with_provider(provider: Arc<dyn SearchIndexProvider>, fetch_config: FetchConfig) -> Self {
        let loader_config = LoaderConfig {
            batch_size: fetch_config.write_batch_size,
        };
        let indexes = SearchIndexes::new(provider, fetch_config);
        let loader = SearchLoader::with_config(indexes, loader_config);
        let orchestrator = Orchestrator::new(ChangeProcessor::new(), loader);

        Self { orchestrator }
    }
}
