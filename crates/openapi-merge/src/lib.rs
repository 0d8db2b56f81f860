//! Aggregation of OpenAPI documents from multiple sources.
//!
//! This crate fetches OpenAPI documents from a list of upstreams, deep-merges them in
//! configured order, folds in the service's own document, and applies a final
//! top-level override.
//!
//! # Example
//!
//! ```ignore
//! use openapi_merge::{AggregationPipeline, HttpFetcher, OpenApiBuilder, Upstream};
//!
//! let local = OpenApiBuilder::new().title("Gateway").version("1.0.0").build();
//! let pipeline = AggregationPipeline::new(HttpFetcher::new()?, local)
//!     .upstream(Upstream::new("http://users:8000/openapi.json"))
//!     .upstream(Upstream::new("http://orders:8000/openapi.json"));
//!
//! let document = pipeline.produce().await?;
//! ```
//!
//! # Precedence
//!
//! Upstreams are folded left to right, then the local document, then the override.
//! See [`merge()`] for the pairwise rules and [`apply_override`] for the final patch.

mod builder;
mod cache;
mod error;
mod fetch;
mod merge;
mod pipeline;
mod types;

pub use builder::OpenApiBuilder;
pub use cache::CachedProducer;
pub use error::{FetchError, PipelineError};
pub use fetch::{DEFAULT_TIMEOUT, Fetch, HttpFetcher};
pub use merge::{apply_override, merge, merge_owned};
pub use pipeline::{AggregationPipeline, DocumentProducer, DocumentProvider, produce};
pub use types::*;

// Re-exported so callers can name `HttpFetcher` construction errors and reuse clients.
pub use reqwest;

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
