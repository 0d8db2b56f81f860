//! HTTP server for an aggregated OpenAPI document.
//!
//! Loads a [`Config`], builds the aggregation pipeline from it, and serves the result.
//!
//! ```ignore
//! let config = Config::load("config.yaml")?;
//! openapi_merge_server::serve(config).await?;
//! ```

pub mod config;
pub mod docs;
pub mod error;
pub mod serve;

pub use config::{Config, ConfigError};
pub use error::{AggregationFailure, ErrorCode, ErrorResponse, IntoErrorCode};
pub use serve::{SharedProducer, build_producer, router, serve};
