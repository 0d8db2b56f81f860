//! Error types for fetching and aggregation.

use crate::types::Upstream;
use thiserror::Error;

/// Errors that can occur while retrieving one upstream document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream unreachable, connection or TLS failure, timeout, or an unusable address.
    #[error("Failed to reach upstream '{url}': {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream reachable but answered with a non-success status.
    #[error("Upstream '{url}' returned {status}: {body}")]
    Response {
        url: String,
        status: u16,
        /// Leading excerpt of the response body.
        body: String,
    },

    /// Response body is not a well-formed JSON document.
    #[error("Upstream '{url}' returned a malformed document: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether the document never arrived (transport or status failure).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Response { .. })
    }

    /// Whether the document arrived but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// The address the failing request was made against.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Response { url, .. } | Self::Parse { url, .. } => {
                url
            }
        }
    }
}

/// Errors that abort a single aggregation run.
///
/// No partial document is ever produced alongside one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An upstream fetch failed; remaining upstreams, the local document and the
    /// override were not processed.
    #[error("Aggregation aborted at upstream #{index} ('{upstream}'): {source}")]
    Abort {
        /// Zero-based position of the upstream in configured order.
        index: usize,
        upstream: Upstream,
        #[source]
        source: FetchError,
    },

    /// The merged document is not a mapping, so top-level override keys cannot be set.
    #[error("Aggregated document is not a mapping; cannot apply override")]
    NotAMapping,
}
