//! Webhook signature verification and typed event payloads.
//!
//! Shopify signs every delivery: the `X-Shopify-Hmac-Sha256` header carries
//! a base64 HMAC-SHA256 digest of the raw request body, keyed with the
//! store's shared webhook secret. Verification runs over the exact bytes
//! received, before any JSON parsing.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;

/// Header carrying the base64 HMAC-SHA256 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";

/// Header naming the event topic.
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Webhook topics this service applies.
///
/// Everything else parses to `Unknown` and is acknowledged without effect,
/// so subscribing the store to new event types cannot break delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookTopic {
    /// Product or variant fields changed.
    ProductsUpdate,
    /// Stock level changed at a location.
    InventoryLevelsUpdate,
    /// Product removed from the store.
    ProductsDelete,
    /// Any topic without a local effect.
    Unknown,
}

impl WebhookTopic {
    /// Parse a topic header value.
    #[must_use]
    pub fn from_header(value: &str) -> Self {
        match value {
            "products/update" => Self::ProductsUpdate,
            "inventory_levels/update" => Self::InventoryLevelsUpdate,
            "products/delete" => Self::ProductsDelete,
            _ => Self::Unknown,
        }
    }
}

/// Verify a webhook delivery's signature against the shared secret.
///
/// Computes HMAC-SHA256 over the raw body bytes, base64-encodes the digest,
/// and compares against the header value in constant time.
#[must_use]
pub fn verify_signature(secret: &SecretString, body: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = STANDARD.encode(mac.finalize().into_bytes());

    constant_time_compare(&expected, signature)
}

/// Compare two strings in constant time to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

// =============================================================================
// Event Payloads
// =============================================================================

/// `products/update` payload, narrowed to the fields this service applies.
#[derive(Debug, Deserialize)]
pub struct ProductUpdateEvent {
    /// Shopify product id.
    pub id: i64,
    /// Product title.
    pub title: String,
    /// Variants carried by the event.
    #[serde(default)]
    pub variants: Vec<EventVariant>,
    /// Product images, in display order.
    #[serde(default)]
    pub images: Vec<EventImage>,
}

/// A variant inside a `products/update` payload.
#[derive(Debug, Deserialize)]
pub struct EventVariant {
    /// Shopify variant id.
    pub id: i64,
    /// Variant title.
    pub title: String,
    /// Price (Shopify sends a decimal string).
    pub price: Decimal,
    /// Units on hand; absent when inventory tracking is off.
    pub inventory_quantity: Option<i64>,
}

/// An image inside a `products/update` payload.
#[derive(Debug, Deserialize)]
pub struct EventImage {
    /// Public CDN URL.
    pub src: String,
}

/// `inventory_levels/update` payload.
#[derive(Debug, Deserialize)]
pub struct InventoryLevelEvent {
    /// Shopify inventory item id.
    pub inventory_item_id: i64,
    /// Units available at the location; null when untracked.
    pub available: Option<i64>,
}

/// `products/delete` payload.
#[derive(Debug, Deserialize)]
pub struct ProductDeleteEvent {
    /// Shopify product id.
    pub id: i64,
}
