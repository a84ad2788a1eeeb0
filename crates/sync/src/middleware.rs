//! HTTP middleware for the sync service.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, trace transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (browser-facing endpoints)

use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};

use crate::shopify::webhooks::{SIGNATURE_HEADER, TOPIC_HEADER};

/// Create the CORS layer.
///
/// The sync trigger and checkout bridge are called from the site frontend,
/// so pre-flight OPTIONS requests must succeed for any origin. Shopify's
/// webhook delivery is server-to-server and ignores CORS, but its headers
/// are allowed here so browser-based delivery tooling can replay events
/// against staging.
#[must_use]
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(SIGNATURE_HEADER),
            HeaderName::from_static(TOPIC_HEADER),
        ])
}
