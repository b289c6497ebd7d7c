//! Upstream error definitions.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;

use crate::upstream::types::PayloadError;

/// Errors that can occur while forwarding to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Client input failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] PayloadError),

    /// The requested todo does not exist upstream.
    #[error("Todo Not Found")]
    NotFound,

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}")]
    Status {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },

    /// Connection or protocol failure.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream did not answer in time.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered 2xx with a body we could not interpret.
    #[error("unexpected upstream payload: {0}")]
    Decode(String),

    /// The client could not be constructed from configuration.
    #[error("invalid upstream configuration: {0}")]
    Config(String),
}

impl UpstreamError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Invalid(_) => "invalid",
            UpstreamError::NotFound => "not_found",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Config(_) => "config",
        }
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;
