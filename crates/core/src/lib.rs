//! Sugar Pine Core - Shared types library.
//!
//! This crate provides common types used across the Sugar Pine Creamery
//! services:
//! - `sync` - Shopify catalog sync, webhook relay, and checkout bridge
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe Shopify identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
