//! Fetching every page of a query with bounded concurrency.
//!
//! The first page is requested alone to learn the page count. The remaining
//! pages are requested in chunks of at most `max_concurrent_requests`; a chunk
//! only starts once the previous one has completed. Hits are concatenated in
//! page order regardless of which request completes first.

use futures::future::try_join_all;
use tracing::{debug, instrument};

use crate::config::FetchConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{SearchRequest, SearchResponse};

/// Fetch every hit matching `request`.
///
/// `request.page` and `request.hits_per_page` are ignored: pages of
/// `config.page_size` hits are requested instead.
///
/// # Returns
///
/// * `Ok(SearchResponse)` - The first page's metadata with the hits of all pages
/// * `Err(SearchIndexError)` - The first error raised by any page request
#[instrument(skip(provider, request, config))]
pub async fn fetch_all(
    provider: &dyn SearchIndexProvider,
    index: &str,
    request: &SearchRequest,
    config: &FetchConfig,
) -> Result<SearchResponse, SearchIndexError> {
    let page_size = config.page_size.max(1);
    let max_concurrent = config.max_concurrent_requests.max(1);

    let mut response = provider
        .search(index, &request.for_page(0, page_size))
        .await?;

    if response.nb_pages <= 1 {
        return Ok(response);
    }

    let remaining: Vec<u32> = (1..response.nb_pages).collect();

    debug!(
        nb_pages = response.nb_pages,
        nb_hits = response.nb_hits,
        chunk_size = max_concurrent,
        "Fetching remaining pages"
    );

    for chunk in remaining.chunks(max_concurrent) {
        let requests: Vec<SearchRequest> = chunk
            .iter()
            .map(|page| request.for_page(*page, page_size))
            .collect();

        let pages = try_join_all(
            requests
                .iter()
                .map(|page_request| provider.search(index, page_request)),
        )
        .await?;

        for page in pages {
            response.hits.extend(page.hits);
        }
    }

    Ok(response)
}
