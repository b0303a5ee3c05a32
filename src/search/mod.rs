//! Property search pipeline
//!
//! Raw query parameters flow through four stages:
//! validation (`params`), query construction (`query`), execution against the
//! search index (`index`) and response shaping (`shape`). `engine` ties them
//! together.

pub mod engine;
pub mod index;
pub mod params;
pub mod query;
pub mod shape;

pub use engine::{SearchEngine, SearchError, DEFAULT_COLLECTION};
pub use index::{ElasticIndex, IndexError, SearchHits, SearchIndex};
pub use params::RawSearchParams;
pub use query::SearchQuery;
