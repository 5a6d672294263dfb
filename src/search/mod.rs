//! Patch search: query composition and per-hit metadata.

pub mod metadata;
pub mod query;

use crate::model::feed::{FeedEntry, SearchResult};

use self::metadata::to_search_item;
use self::query::SearchQuery;

/// Build a search result from feed entries, in feed order.
pub fn build_search_result(query: &SearchQuery, entries: Vec<FeedEntry>) -> SearchResult {
    let results: Vec<_> = entries.into_iter().map(to_search_item).collect();
    SearchResult {
        query: query.text.clone(),
        filters: query.filters.clone(),
        total_results: results.len(),
        results,
    }
}
