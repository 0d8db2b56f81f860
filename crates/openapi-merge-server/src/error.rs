//! Mapping of aggregation failures to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use openapi_merge::PipelineError;
use serde_json::json;

/// Error code reported to clients of the serving boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// 500 Internal Server Error
    Internal,
    /// 502 Bad Gateway
    BadGateway,
    /// 504 Gateway Timeout
    GatewayTimeout,
}

impl ErrorCode {
    /// Convert to HTTP status code
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::Internal => 500,
            ErrorCode::BadGateway => 502,
            ErrorCode::GatewayTimeout => 504,
        }
    }

    /// Upper snake case name used in response bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::BadGateway => "BAD_GATEWAY",
            ErrorCode::GatewayTimeout => "GATEWAY_TIMEOUT",
        }
    }
}

/// Trait for converting errors to error codes.
pub trait IntoErrorCode {
    /// Get the error code for this error
    fn error_code(&self) -> ErrorCode;

    /// Get a human-readable message
    fn message(&self) -> String;
}

impl IntoErrorCode for PipelineError {
    fn error_code(&self) -> ErrorCode {
        match self {
            PipelineError::Abort { source, .. } => match source {
                openapi_merge::FetchError::Transport { source, .. } if source.is_timeout() => {
                    ErrorCode::GatewayTimeout
                }
                _ => ErrorCode::BadGateway,
            },
            PipelineError::NotAMapping => ErrorCode::Internal,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

/// A serializable error body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// A failed aggregation as returned from a handler.
#[derive(Debug)]
pub struct AggregationFailure(pub PipelineError);

impl From<PipelineError> for AggregationFailure {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AggregationFailure {
    fn into_response(self) -> Response {
        let code = self.0.error_code();
        let mut body = ErrorResponse::new(code, self.0.message());
        if let PipelineError::Abort {
            index, upstream, ..
        } = &self.0
        {
            body = body.with_details(json!({"upstream": upstream, "index": index}));
        }

        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
