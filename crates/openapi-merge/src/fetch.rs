//! Retrieval of upstream OpenAPI documents.

use crate::error::FetchError;
use crate::types::Upstream;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout for [`HttpFetcher`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BODY_EXCERPT_CHARS: usize = 200;

/// Source of upstream documents.
///
/// Implementations must not retry; every failure is reported to the pipeline, which
/// aborts the run.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Retrieve and parse the document at `upstream`.
    async fn fetch(&self, upstream: &Upstream) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T> Fetch for Arc<T>
where
    T: Fetch + ?Sized,
{
    async fn fetch(&self, upstream: &Upstream) -> Result<Value, FetchError> {
        self.as_ref().fetch(upstream).await
    }
}

/// Fetches documents with `GET` over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Create a fetcher with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Use an existing client (shared connection pool, custom TLS roots, ...).
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, upstream: &Upstream) -> Result<Value, FetchError> {
        let url = upstream.url();
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Response {
                url: url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}
