//! Jaka Auth API
//!
//! Authentication service exchanging Telegram Login Widget payloads for
//! session tokens and guarding private routes with them.
//!
//! ## REST Endpoints
//!
//! - `POST /api/v1/auth/telegram` - Verify a login payload, issue a session token
//! - `GET /api/v1/auth/me` - Resolve the bearer to its principal
//! - `GET /api/v1/dashboard` - Private greeting
//! - `GET /api/v1/admin` - Private admin greeting
//! - `GET /api/v1/` and `GET /api/v1/info` - Public routes
//!
//! ## Health Endpoints
//!
//! - `GET /health` and `GET /api/v1/health` - Liveness probe

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::health;
use crate::state::AppState;

/// Build the HTTP router with its middleware stack
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout();

    let api_v1 = Router::new()
        // Public routes
        .route("/", get(handlers::home))
        .route("/info", get(handlers::info))
        // Auth routes
        .route("/auth/telegram", post(handlers::telegram_login))
        .route("/auth/me", get(handlers::me))
        // Private routes
        .route("/dashboard", get(handlers::dashboard))
        .route("/admin", get(handlers::admin));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health));

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(timeout_layer(request_timeout));

    // Nesting maps "/" to "/api/v1" only, so the trailing-slash form is explicit
    Router::new()
        .nest("/api/v1", api_v1)
        .route("/api/v1/", get(handlers::home))
        .layer(middleware)
        .merge(health_routes)
        .with_state(state)
}

/// Requests exceeding `request_timeout` are answered with 408
fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}
