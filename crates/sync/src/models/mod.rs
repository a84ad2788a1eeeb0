//! Data models for the sync service.

pub mod product;

pub use product::{CatalogRecord, ListingUpdate};
