//! Shopify API clients for the sync subsystem.
//!
//! # Architecture
//!
//! - Admin REST API for full catalog listing (read-only, paginated)
//! - Storefront GraphQL API for checkout creation
//! - Webhook signature verification and typed event payloads
//! - Raw query strings with typed serde envelopes; responses are parsed
//!   into structs rather than inspected as loose JSON
//!
//! # Security
//!
//! All tokens live in [`crate::config::ShopifySyncConfig`] as `SecretString`
//! and are only exposed when request headers are built. Webhook deliveries
//! are rejected before parsing unless their HMAC signature verifies.

pub mod checkout;
pub mod rest;
pub mod webhooks;

pub use checkout::{CheckoutLine, CheckoutSession, StorefrontClient};
pub use rest::AdminClient;

use std::time::Duration;

use thiserror::Error;

/// Per-request timeout for Shopify API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout for Shopify API calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client both API clients share the configuration of.
///
/// # Panics
///
/// Panics if the HTTP client cannot be created. This should never happen
/// under normal circumstances as we use standard TLS configuration.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Errors that can occur when interacting with the Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success HTTP status.
    #[error("Shopify returned {status}: {body}")]
    Status {
        /// HTTP status code from Shopify.
        status: reqwest::StatusCode,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response was missing an expected field.
    #[error("Shopify response missing {0}")]
    MissingData(&'static str),

    /// User error from a mutation (e.g., an unpurchasable checkout line).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
