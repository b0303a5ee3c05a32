//! Search Engine Integration
//!
//! Ties together parameter validation, query building, index execution and
//! response shaping into the single search pipeline used by the HTTP handler
//! and the CLI.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::index::{IndexError, SearchIndex};
use super::params::{RawSearchParams, ValidationError};
use super::query::SearchQuery;
use super::shape::shape_results;

/// Collection queried when none is configured
pub const DEFAULT_COLLECTION: &str = "properties";

/// Everything that can stop a search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Well-formed query with zero matches
    #[error("No results found")]
    NoResults,
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Stateless search pipeline over an injected index
#[derive(Clone)]
pub struct SearchEngine {
    index: Arc<dyn SearchIndex>,
    collection: String,
}

impl SearchEngine {
    pub fn new(index: Arc<dyn SearchIndex>, collection: impl Into<String>) -> Self {
        Self {
            index,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Validate the raw parameters and build the query without executing it
    pub fn prepare(&self, params: &RawSearchParams) -> Result<SearchQuery, SearchError> {
        let request = params.validate()?;
        Ok(SearchQuery::build(&request))
    }

    /// validate -> build -> execute -> shape
    pub async fn search(&self, params: &RawSearchParams) -> Result<Vec<Value>, SearchError> {
        let query = match self.prepare(params) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, "Rejected search parameters");
                return Err(e);
            }
        };

        debug!(
            clauses = query.must.len(),
            sort = ?query.sort,
            dsl = %query.to_dsl(),
            "Built search query"
        );

        let hits = self
            .index
            .search(&self.collection, &query)
            .await
            .map_err(|e| {
                warn!(error = %e, collection = %self.collection, "Search index call failed");
                e
            })?;
        debug!(hits = hits.len(), "Index responded");

        let results = shape_results(hits)?;
        info!(count = results.len(), "Search completed");
        Ok(results)
    }
}
