//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SyncConfig;
use crate::shopify::{AdminClient, StorefrontClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SyncConfig,
    pool: PgPool,
    admin: AdminClient,
    storefront: StorefrontClient,
}

impl AppState {
    /// Create a new application state, building both Shopify clients from
    /// the validated configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Sync service configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: SyncConfig, pool: PgPool) -> Self {
        let admin = AdminClient::new(&config.shopify);
        let storefront = StorefrontClient::new(&config.shopify);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                admin,
                storefront,
            }),
        }
    }

    /// Get a reference to the sync service configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify_admin(&self) -> &AdminClient {
        &self.inner.admin
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn shopify_storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }
}
