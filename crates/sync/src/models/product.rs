//! Product write models.
//!
//! The sync subsystem never reads product rows back, so these are
//! write-side payloads only. Curated fields (category, featured flags,
//! display ordering) are owned by the site and deliberately absent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sugarpine_core::{ShopifyInventoryItemId, ShopifyProductId, ShopifyVariantId};

/// Everything the full catalog sync writes for one (product, variant) pair.
///
/// Records are keyed by `shopify_variant_id`; a product with three variants
/// produces three records.
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    /// Display name (product title, variant-qualified)
    pub name: String,
    /// URL slug, written on first insert only so links stay stable
    pub slug: String,
    /// Plain-text teaser, at most 200 characters
    pub short_description: String,
    /// Full plain-text description
    pub description: String,
    /// Variant price
    pub price: Decimal,
    /// First product image, if any
    pub image_url: Option<String>,
    /// Whether inventory is currently above zero
    pub in_stock: bool,
    /// Shopify product id
    pub shopify_product_id: ShopifyProductId,
    /// Shopify variant id (upsert key)
    pub shopify_variant_id: ShopifyVariantId,
    /// Shopify inventory item id, used to match inventory webhooks
    pub shopify_inventory_item_id: Option<ShopifyInventoryItemId>,
    /// When this record was last written from Shopify data
    pub last_synced_at: DateTime<Utc>,
}

/// The field-scoped patch a `products/update` webhook applies.
///
/// Narrower than [`CatalogRecord`]: webhook payloads carry no description
/// HTML worth trusting, and slugs are never rewritten after insert.
#[derive(Debug, Clone)]
pub struct ListingUpdate {
    /// Shopify variant id (match key)
    pub shopify_variant_id: ShopifyVariantId,
    /// Display name (product title, variant-qualified)
    pub name: String,
    /// Variant price
    pub price: Decimal,
    /// Whether inventory is currently above zero
    pub in_stock: bool,
    /// First product image, if any (null overwrites: removed images clear out)
    pub image_url: Option<String>,
    /// When this record was last written from Shopify data
    pub last_synced_at: DateTime<Utc>,
}
