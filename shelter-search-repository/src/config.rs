//! Configuration types for the search provider and index delegates.

use std::env;

use crate::errors::SearchIndexError;

/// Environment variable holding the provider application ID.
pub const APP_ID_VAR: &str = "ALGOLIA_APP_ID";

/// Environment variable holding the provider admin API key.
pub const ADMIN_KEY_VAR: &str = "ALGOLIA_ADMIN_KEY";

/// Environment variable overriding the provider base URL.
pub const HOST_VAR: &str = "ALGOLIA_HOST";

/// Credentials and endpoint of the hosted search provider.
///
/// Built once at startup and injected into the provider. Missing credentials
/// are a startup failure, never a lazy failure on the first search.
#[derive(Clone)]
pub struct AlgoliaConfig {
    pub application_id: String,
    pub admin_api_key: String,
    /// Base URL used for every request instead of the provider's own hosts.
    pub host: Option<String>,
}

impl std::fmt::Debug for AlgoliaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaConfig")
            .field("application_id", &self.application_id)
            .field("admin_api_key", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

impl AlgoliaConfig {
    pub fn new(application_id: impl Into<String>, admin_api_key: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            admin_api_key: admin_api_key.into(),
            host: None,
        }
    }

    /// Send every request to `host` (e.g. `http://localhost:8108`).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ALGOLIA_APP_ID`: provider application ID (required)
    /// - `ALGOLIA_ADMIN_KEY`: provider admin API key (required)
    /// - `ALGOLIA_HOST`: base URL override (optional)
    ///
    /// # Returns
    ///
    /// * `Ok(AlgoliaConfig)` - If both credentials are present
    /// * `Err(SearchIndexError::ConfigurationError)` - If a credential is missing or blank
    pub fn from_env() -> Result<Self, SearchIndexError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SearchIndexError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| SearchIndexError::configuration(format!("{} is required", key)))
        };

        let application_id = required(APP_ID_VAR)?;
        let admin_api_key = required(ADMIN_KEY_VAR)?;
        let host = lookup(HOST_VAR).filter(|value| !value.trim().is_empty());

        Ok(Self {
            application_id,
            admin_api_key,
            host,
        })
    }
}

/// Limits applied by the index delegates when talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Page size used when fetching every hit of a query.
    ///
    /// Defaults to 1000, the largest page the provider serves.
    pub page_size: u32,

    /// Maximum number of page requests in flight at once.
    ///
    /// Defaults to 10.
    pub max_concurrent_requests: usize,

    /// Maximum number of objects sent in a single write batch.
    ///
    /// Defaults to 1000.
    pub write_batch_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_concurrent_requests: 10,
            write_batch_size: 1000,
        }
    }
}

impl FetchConfig {
    /// Read optional overrides from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_FETCH_PAGE_SIZE` (default: 1000)
    /// - `SEARCH_MAX_CONCURRENT_REQUESTS` (default: 10)
    /// - `SEARCH_WRITE_BATCH_SIZE` (default: 1000)
    ///
    /// Unparseable or zero values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            page_size: parse_positive(&lookup, "SEARCH_FETCH_PAGE_SIZE")
                .unwrap_or(defaults.page_size),
            max_concurrent_requests: parse_positive(&lookup, "SEARCH_MAX_CONCURRENT_REQUESTS")
                .unwrap_or(defaults.max_concurrent_requests),
            write_batch_size: parse_positive(&lookup, "SEARCH_WRITE_BATCH_SIZE")
                .unwrap_or(defaults.write_batch_size),
        }
    }

    /// Create a config with a custom page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create a config with a custom concurrency bound.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }

    /// Create a config with a custom write batch size.
    pub fn with_write_batch_size(mut self, size: usize) -> Self {
        self.write_batch_size = size.max(1);
        self
    }
}

fn parse_positive<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    lookup(key)
        .and_then(|value| value.trim().parse::<T>().ok())
        .filter(|value| *value > T::default())
}
