//! Business logic for the sync service.
//!
//! # Services
//!
//! - `catalog` - Full catalog synchronization from the Admin REST API
//! - `webhooks` - Incremental application of signed Shopify events

pub mod catalog;
pub mod webhooks;
