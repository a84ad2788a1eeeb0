//! Unified error handling for the sync service.
//!
//! Handler errors are converted into the JSON envelope the frontend expects:
//! `{ "success": false, "error": "..." }`. Server-side failures are reported
//! to Sentry before the response is built; client mistakes are only logged.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::shopify::ShopifyError;

/// Convenience alias for handler results.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type for all route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shopify API call failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Request could not be authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The request was malformed or failed validation.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status this error maps to.
    ///
    /// Checkout user errors are the caller's problem (400); any other
    /// Shopify failure means the upstream call itself broke (502).
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(ShopifyError::UserError(_)) => StatusCode::BAD_REQUEST,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to return to the client. Internal details stay in logs.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) => "A storage error occurred".to_string(),
            Self::Shopify(ShopifyError::UserError(message)) => message.clone(),
            Self::Shopify(_) => "Upstream commerce platform error".to_string(),
            Self::Unauthorized(message) | Self::BadRequest(message) => message.clone(),
        }
    }

    /// Whether this failure is ours (reported to Sentry) or the caller's.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) => true,
            Self::Shopify(err) => !matches!(err, ShopifyError::UserError(_)),
            Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, %event_id, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = json!({
            "success": false,
            "error": self.client_message(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}
