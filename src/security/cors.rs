//! Cross-origin policy middleware.
//!
//! Requests carrying an `Origin` outside the configured allow-list are
//! turned away before any handler runs. Every other response leaves with an
//! `Access-Control-Allow-Origin` header: the caller's origin when it sent
//! one, `*` otherwise.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN},
        HeaderValue, Request,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::CorsConfig;
use crate::http::response::GatewayError;

/// Allow-list of origins permitted to call the gateway.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(config.allowed_origins.clone())
    }

    /// Whether a request with this `Origin` header may proceed.
    /// Requests without an origin are always admitted.
    pub fn admits(&self, origin: Option<&HeaderValue>) -> bool {
        let Some(origin) = origin else {
            return true;
        };
        if self.allowed.is_empty() {
            return true;
        }
        origin
            .to_str()
            .map(|origin| self.allowed.iter().any(|allowed| allowed == origin))
            .unwrap_or(false)
    }

    /// Value for `Access-Control-Allow-Origin`.
    pub fn allow_origin(origin: Option<&HeaderValue>) -> HeaderValue {
        origin
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"))
    }
}

/// Middleware enforcing [`OriginPolicy`] and stamping the allow-origin header.
pub async fn origin_policy_middleware(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    if !policy.admits(origin.as_ref()) {
        tracing::warn!(origin = ?origin, path = %request.uri().path(), "Origin not allowed");
        return GatewayError::OriginNotAllowed.into_response();
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert_with(|| OriginPolicy::allow_origin(origin.as_ref()));
    response
}
