//! HTTP route handlers for the sync service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (verifies database)
//!
//! # Sync
//! POST /sync/products      - Trigger a full catalog sync (operator/cron)
//!
//! # Webhooks
//! POST /webhooks/shopify   - Signed Shopify event receiver
//!
//! # Checkout
//! POST /checkout           - Create a Shopify checkout from cart lines
//! ```

pub mod checkout;
pub mod sync;
pub mod webhooks;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the sync service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/sync/products", post(sync::trigger))
        .route("/webhooks/shopify", post(webhooks::receive))
        .route("/checkout", post(checkout::create))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
