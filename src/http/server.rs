//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, origin policy, metrics)
//! - Own the shared token bucket and upstream client
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::echo::echo;
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::GatewayError;
use crate::http::status::get_status;
use crate::http::todos::{
    create_todo, delete_todo, delete_todo_by_id, get_todo, list_todos, update_todo,
    update_todo_by_id,
};
use crate::observability::metrics;
use crate::security::{origin_policy_middleware, OriginPolicy, TokenBucket};
use crate::upstream::{UpstreamClient, UpstreamResult};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    /// `None` when rate limiting is disabled.
    pub limiter: Option<Arc<TokenBucket>>,
}

impl AppState {
    /// Take one token from the shared bucket.
    pub fn admit(&self, route: &'static str) -> Result<(), GatewayError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        let remaining = limiter.try_acquire();
        tracing::debug!(route, remaining, "Rate limit check");

        if remaining < 0 {
            tracing::warn!(route, remaining, "Rate limit exceeded");
            metrics::record_rate_limited(route);
            return Err(GatewayError::RateLimited { remaining });
        }
        Ok(())
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Option<Arc<TokenBucket>>,
}

impl HttpServer {
    /// Create a new HTTP server, building the bucket from configuration.
    pub fn new(config: GatewayConfig) -> UpstreamResult<Self> {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(TokenBucket::from_config(&config.rate_limit)));
        Self::with_limiter(config, limiter)
    }

    /// Create a new HTTP server around an existing bucket.
    pub fn with_limiter(
        config: GatewayConfig,
        limiter: Option<Arc<TokenBucket>>,
    ) -> UpstreamResult<Self> {
        let upstream = UpstreamClient::new(&config.upstream)?;

        let state = AppState {
            upstream,
            limiter: limiter.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let api = Router::new()
            .route(
                "/todos",
                get(list_todos)
                    .post(create_todo)
                    .put(update_todo)
                    .delete(delete_todo),
            )
            .route(
                "/todos/{id}",
                get(get_todo).put(update_todo_by_id).delete(delete_todo_by_id),
            )
            .route("/echo", get(echo))
            .route("/status", get(get_status))
            .with_state(state);

        let prefix = config.api_prefix.trim_end_matches('/');
        let app = if prefix.is_empty() {
            api
        } else {
            Router::new().nest(prefix, api)
        };

        let policy = Arc::new(OriginPolicy::from_config(&config.cors));

        // Outermost first: the request ID exists before the trace span opens.
        let stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        // The body limit sits inside the origin policy so its 413 is stamped too.
        app.layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(middleware::from_fn_with_state(policy, origin_policy_middleware))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(stack)
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            rate_limit_capacity = self.limiter.as_ref().map(|l| l.capacity()),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn limiter(&self) -> Option<&Arc<TokenBucket>> {
        self.limiter.as_ref()
    }
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}
