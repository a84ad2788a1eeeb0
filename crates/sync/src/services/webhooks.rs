//! Incremental application of Shopify webhook events.
//!
//! Each topic touches only the fields its payload is authoritative for.
//! Records the full sync has never created are skipped, never invented:
//! webhook payloads lack the description copy a complete record needs, and
//! the next full sync closes the gap.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sugarpine_core::{ShopifyInventoryItemId, ShopifyProductId, ShopifyVariantId};
use tracing::{debug, instrument};

use crate::db::{RepositoryError, products};
use crate::models::ListingUpdate;
use crate::shopify::webhooks::{
    EventVariant, InventoryLevelEvent, ProductDeleteEvent, ProductUpdateEvent,
};
use crate::text;

/// Counts from applying a `products/update` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOutcome {
    /// Variants that matched a local record and were patched.
    pub matched: u32,
    /// Variants with no local record, left alone.
    pub skipped: u32,
}

/// Apply a `products/update` event.
///
/// Overwrites name, price, stock flag, and image for every variant we
/// already track. The payload's image list is authoritative: a product
/// whose images were all removed clears `image_url`.
///
/// # Errors
///
/// Returns error if a database write fails.
#[instrument(skip(pool, event), fields(product_id = event.id))]
pub async fn apply_product_update(
    pool: &PgPool,
    event: &ProductUpdateEvent,
) -> Result<UpdateOutcome, RepositoryError> {
    let now = Utc::now();
    let mut outcome = UpdateOutcome::default();

    for variant in &event.variants {
        let update = listing_update(event, variant, now);

        if products::apply_listing_update(pool, &update).await? {
            outcome.matched += 1;
        } else {
            outcome.skipped += 1;
        }
    }

    debug!(
        matched = outcome.matched,
        skipped = outcome.skipped,
        "Applied product update"
    );
    Ok(outcome)
}

/// Map one event variant onto the patch the database applies.
fn listing_update(
    event: &ProductUpdateEvent,
    variant: &EventVariant,
    now: DateTime<Utc>,
) -> ListingUpdate {
    ListingUpdate {
        shopify_variant_id: ShopifyVariantId::from(variant.id),
        name: text::display_name(&event.title, &variant.title),
        price: variant.price,
        in_stock: variant.inventory_quantity.unwrap_or(0) > 0,
        image_url: event.images.first().map(|image| image.src.clone()),
        last_synced_at: now,
    }
}

/// Apply an `inventory_levels/update` event: the stock flag and sync
/// timestamp only, matched by inventory item id.
///
/// Returns whether a local record matched.
///
/// # Errors
///
/// Returns error if the database write fails.
#[instrument(skip(pool, event), fields(inventory_item_id = event.inventory_item_id))]
pub async fn apply_inventory_update(
    pool: &PgPool,
    event: &InventoryLevelEvent,
) -> Result<bool, RepositoryError> {
    let item_id = ShopifyInventoryItemId::from(event.inventory_item_id);
    let in_stock = available_units(event) > 0;

    let matched =
        products::set_stock_by_inventory_item(pool, &item_id, in_stock, Utc::now()).await?;
    if !matched {
        debug!("No local record for inventory item");
    }
    Ok(matched)
}

/// Units available per the event; untracked items count as zero.
const fn available_units(event: &InventoryLevelEvent) -> i64 {
    match event.available {
        Some(units) => units,
        None => 0,
    }
}

/// Apply a `products/delete` event: flag every record of the product out
/// of stock. Rows are tombstoned, never removed.
///
/// Returns the number of records flagged.
///
/// # Errors
///
/// Returns error if the database write fails.
#[instrument(skip(pool, event), fields(product_id = event.id))]
pub async fn apply_product_delete(
    pool: &PgPool,
    event: &ProductDeleteEvent,
) -> Result<u64, RepositoryError> {
    products::flag_product_out_of_stock(pool, &ShopifyProductId::from(event.id)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    // Database-touching paths are covered by the integration-tests crate;
    // these pin the pure event-to-patch mapping.

    #[test]
    fn test_listing_update_qualifies_variant_name() {
        let event: ProductUpdateEvent = serde_json::from_str(
            r#"{
                "id": 111,
                "title": "Vanilla Roll",
                "variants": [{"id": 222, "title": "Six Pack", "price": "15.00", "inventory_quantity": 4}],
                "images": []
            }"#,
        )
        .unwrap();

        let update = listing_update(&event, &event.variants[0], Utc::now());
        assert_eq!(update.name, "Vanilla Roll - Six Pack");
        assert_eq!(update.shopify_variant_id.as_str(), "222");
        assert_eq!(update.price, Decimal::new(1500, 2));
        assert!(update.in_stock);
        assert_eq!(update.image_url, None);
    }

    #[test]
    fn test_listing_update_missing_quantity_means_out_of_stock() {
        let event: ProductUpdateEvent = serde_json::from_str(
            r#"{
                "id": 111,
                "title": "Mango Tango",
                "variants": [{"id": 222, "title": "Default Title", "price": "6.00"}],
                "images": [{"src": "https://cdn.shopify.com/mango.jpg"}]
            }"#,
        )
        .unwrap();

        let update = listing_update(&event, &event.variants[0], Utc::now());
        assert_eq!(update.name, "Mango Tango");
        assert!(!update.in_stock);
        assert_eq!(
            update.image_url.as_deref(),
            Some("https://cdn.shopify.com/mango.jpg")
        );
    }

    #[test]
    fn test_available_units_defaults_to_zero() {
        let event: InventoryLevelEvent =
            serde_json::from_str(r#"{"inventory_item_id": 301, "available": null}"#).unwrap();
        assert_eq!(available_units(&event), 0);

        let event: InventoryLevelEvent =
            serde_json::from_str(r#"{"inventory_item_id": 301, "available": 7}"#).unwrap();
        assert_eq!(available_units(&event), 7);
    }
}
