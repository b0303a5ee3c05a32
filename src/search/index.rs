//! Search Executor
//!
//! The [`SearchIndex`] seam sends a built [`SearchQuery`] to a search index
//! and hands back the raw hit envelope. [`ElasticIndex`] is the HTTP backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::query::SearchQuery;

/// Failures talking to the search index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Search index request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Search index returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid search index URL: {0}")]
    InvalidUrl(String),
}

/// Hit envelope returned by the index (`hits.hits[]`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    pub hits: HitList,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitList {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// A single matched document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchHits {
    /// Wrap plain documents as hits, keeping their order
    pub fn from_sources(sources: Vec<Value>) -> Self {
        let hits = sources
            .into_iter()
            .map(|source| Hit {
                id: None,
                score: None,
                source,
            })
            .collect();
        Self {
            hits: HitList { hits },
        }
    }

    pub fn len(&self) -> usize {
        self.hits.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.hits.is_empty()
    }
}

/// Something that can answer a [`SearchQuery`] for a named collection
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, collection: &str, query: &SearchQuery) -> Result<SearchHits, IndexError>;
}

/// Elasticsearch-compatible index reached over HTTP
pub struct ElasticIndex {
    client: Client,
    base_url: Url,
}

impl ElasticIndex {
    /// Create a client for the index at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let base_url = parse_base_url(base_url)?;
        let client = crate::http::client_with_timeout(timeout)?;
        Ok(Self { client, base_url })
    }

    /// `<base>/<collection>/_search`
    pub fn search_url(&self, collection: &str) -> Result<Url, IndexError> {
        self.base_url
            .join(&format!("{}/_search", collection))
            .map_err(|e| IndexError::InvalidUrl(e.to_string()))
    }
}

/// Parse the base URL, making sure it ends with `/` so joins append
fn parse_base_url(raw: &str) -> Result<Url, IndexError> {
    let mut url = Url::parse(raw).map_err(|e| IndexError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(IndexError::InvalidUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    async fn search(&self, collection: &str, query: &SearchQuery) -> Result<SearchHits, IndexError> {
        let url = self.search_url(collection)?;
        debug!(%url, "Querying search index");

        let response = self.client.post(url).json(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let hits: SearchHits = response.json().await?;
        Ok(hits)
    }
}
