//! HTTP client utilities
//!
//! Provides the reqwest::Client used to reach the search index

use reqwest::Client;
use std::time::Duration;

/// Build a reqwest Client with the given timeout.
///
/// System proxy env vars (HTTP_PROXY, HTTPS_PROXY, NO_PROXY) are honored by
/// reqwest itself.
pub fn client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(concat!("propsearch/", env!("CARGO_PKG_VERSION")))
        .build()
}
