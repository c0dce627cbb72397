pub mod auth;
pub mod ledger;
pub mod messages;
pub mod middleware;
pub mod state;

pub use middleware::{CurrentUser, RateLimiter};
pub use state::AppState;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Endpoints behind bearer-token auth
    let protected = Router::new()
        .route("/api/info", post(ledger::info))
        .route("/api/saveAddress", post(messages::save_address))
        .route("/api/contacts", post(messages::contacts))
        .route("/api/savemessage", post(messages::save_message))
        .route("/api/getmessages", post(messages::get_messages))
        .route("/api/protected", get(auth::protected))
        .route("/api/poor", post(ledger::poor))
        .route("/api/public", post(messages::public_key))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        // Ledger and service info
        .route("/api/", get(ledger::home))
        .route("/api/provider", post(ledger::provider))
        .route("/api/health", get(health))
        // Session lifecycle
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/refresh", post(auth::refresh))
        .merge(protected)
        // Add rate limiting middleware
        .layer(axum_middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_middleware(limiter, req, next)
        }))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Records `value` or notes the field as missing; handlers report every
/// missing field of a request in one validation error.
pub(crate) fn require<T>(
    missing: &mut Vec<&'static str>,
    name: &'static str,
    value: Option<T>,
) -> Option<T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}
