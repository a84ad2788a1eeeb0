//! Database operations for the sync `PostgreSQL` store.
//!
//! # Database: `sugarpine`
//!
//! The sync service owns one table:
//!
//! - `products` - Locally mirrored Shopify catalog, one row per
//!   (product, variant) pair, keyed by `shopify_variant_id` (unique)
//!
//! Sync-owned columns: `name`, `slug` (insert only), `short_description`,
//! `description`, `price`, `image_url`, `in_stock`, `shopify_product_id`,
//! `shopify_variant_id`, `shopify_inventory_item_id`, `last_synced_at`.
//! Curated columns (category, featured flags, display order) belong to the
//! site and are never named in sync statements, so editorial work survives
//! every sync and webhook.

pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
