//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Parse todo bodies before any token is taken from the bucket
//!
//! # Design Decisions
//! - An empty body counts as "no body"; validation then reports what is missing
//! - Anything that is not a JSON object is rejected as malformed

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::http::response::GatewayError;
use crate::upstream::TodoPayload;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Produces UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID for logging, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Optional JSON todo body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoBody(pub Option<TodoPayload>);

impl TodoBody {
    pub fn parse(bytes: &[u8]) -> Result<Self, GatewayError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }
        let malformed = |reason: String| GatewayError::MalformedBody {
            status: axum::http::StatusCode::BAD_REQUEST,
            reason,
        };

        // Struct deserializers also accept arrays positionally.
        let value: Value = serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(malformed("expected a JSON object".to_string()));
        }
        serde_json::from_value(value)
            .map(|payload| Self(Some(payload)))
            .map_err(|e| malformed(e.to_string()))
    }

    /// The payload, or an empty one when no body was sent.
    pub fn into_payload(self) -> TodoPayload {
        self.0.unwrap_or_default()
    }
}

impl<S> FromRequest<S> for TodoBody
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| GatewayError::MalformedBody {
                status: rejection.status(),
                reason: rejection.body_text(),
            })?;
        Self::parse(&bytes)
    }
}
