//! Response Shaper
//!
//! Flattens index hits into the list of property documents returned to clients.

use serde_json::Value;

use super::engine::SearchError;
use super::index::SearchHits;
use super::query::MAX_RESULTS;

/// Extract each hit's document body in index order.
///
/// An empty list is reported as [`SearchError::NoResults`].
pub fn shape_results(hits: SearchHits) -> Result<Vec<Value>, SearchError> {
    let documents: Vec<Value> = hits
        .hits
        .hits
        .into_iter()
        .take(MAX_RESULTS)
        .map(|hit| hit.source)
        .collect();

    if documents.is_empty() {
        return Err(SearchError::NoResults);
    }

    Ok(documents)
}
