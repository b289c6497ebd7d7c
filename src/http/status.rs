//! Service status endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct RateLimitStatus {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub rate_limit: RateLimitStatus,
}

/// `GET /status`. Does not consume a token.
pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let rate_limit = match &state.limiter {
        Some(limiter) => {
            let snapshot = limiter.snapshot();
            RateLimitStatus {
                enabled: true,
                capacity: Some(snapshot.capacity),
                available: Some(snapshot.available),
            }
        }
        None => RateLimitStatus {
            enabled: false,
            capacity: None,
            available: None,
        },
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        rate_limit,
    })
}
