//! Response mapping.
//!
//! # Responsibilities
//! - Map every gateway failure to exactly one HTTP response
//! - Pass upstream error statuses and bodies through unchanged
//! - Keep the message-style contract: validation failures and missing
//!   todos answer 200 with a `message` field

use axum::{
    body::Body,
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// `{"message": "..."}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for Message {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Errors that end a gateway request early.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The shared bucket is empty.
    #[error("rate limit exceeded ({remaining} tokens remaining)")]
    RateLimited { remaining: i64 },

    /// The body could not be read or is not a JSON object.
    #[error("malformed request body: {reason}")]
    MalformedBody { status: StatusCode, reason: String },

    /// The `Origin` header is not on the allow-list.
    #[error("origin not allowed")]
    OriginNotAllowed,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

fn plain_text(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::RateLimited { .. } => {
                let mut response = plain_text(StatusCode::TOO_MANY_REQUESTS);
                response
                    .headers_mut()
                    .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
                response
            }
            GatewayError::OriginNotAllowed => plain_text(StatusCode::BAD_REQUEST),
            GatewayError::MalformedBody { status, reason } => {
                (status, Json(Message::new(format!("Malformed request body: {reason}"))))
                    .into_response()
            }
            GatewayError::Upstream(err) => upstream_response(err),
        }
    }
}

fn upstream_response(err: UpstreamError) -> Response {
    match err {
        UpstreamError::Invalid(payload_error) => Message::new(payload_error.to_string()).into_response(),
        UpstreamError::NotFound => Message::new("Todo Not Found").into_response(),
        UpstreamError::Status {
            status,
            content_type,
            body,
        } => {
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = status;
            if let Some(content_type) = content_type {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            response
        }
        UpstreamError::Timeout(_) => {
            (StatusCode::GATEWAY_TIMEOUT, Json(Message::new("Upstream request timed out")))
                .into_response()
        }
        UpstreamError::Transport(_) | UpstreamError::Decode(_) | UpstreamError::Config(_) => {
            (StatusCode::BAD_GATEWAY, Json(Message::new("Upstream request failed"))).into_response()
        }
    }
}
