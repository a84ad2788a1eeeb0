//! Full catalog synchronization.
//!
//! Pulls every product from the Admin REST API and upserts one local
//! record per (product, variant) pair. A transport failure aborts the run
//! and nothing is marked stale; a single bad variant is logged, counted,
//! and skipped so the rest of the catalog still lands.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sugarpine_core::{ShopifyInventoryItemId, ShopifyProductId, ShopifyVariantId};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::db::{RepositoryError, products};
use crate::models::CatalogRecord;
use crate::shopify::ShopifyError;
use crate::shopify::rest::{AdminClient, RestProduct, RestVariant};
use crate::text;

/// Counts reported by a catalog sync run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOutcome {
    /// Variant records successfully upserted.
    pub synced: u32,
    /// Variants skipped over a per-item failure.
    pub errors: u32,
}

/// Reasons one (product, variant) pair fails to sync.
#[derive(Debug, Error)]
enum ItemError {
    #[error("variant has no price")]
    MissingPrice,
    #[error("unparseable price {0:?}")]
    BadPrice(String),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Pull the complete catalog and upsert every (product, variant) pair.
///
/// # Errors
///
/// Returns `ShopifyError` when the catalog listing itself fails. Per-item
/// failures never propagate; they are counted in the outcome.
#[instrument(skip(shopify, pool))]
pub async fn run(shopify: &AdminClient, pool: &PgPool) -> Result<SyncOutcome, ShopifyError> {
    let catalog = shopify.fetch_all_products().await?;
    info!(products = catalog.len(), "Fetched full catalog");

    let mut outcome = SyncOutcome::default();
    let now = Utc::now();

    for product in &catalog {
        for variant in &product.variants {
            match sync_variant(pool, product, variant, now).await {
                Ok(()) => outcome.synced += 1,
                Err(error) => {
                    warn!(
                        product_id = product.id,
                        variant_id = variant.id,
                        %error,
                        "Skipping variant"
                    );
                    outcome.errors += 1;
                }
            }
        }
    }

    info!(
        synced = outcome.synced,
        errors = outcome.errors,
        "Catalog sync complete"
    );
    Ok(outcome)
}

async fn sync_variant(
    pool: &PgPool,
    product: &RestProduct,
    variant: &RestVariant,
    now: DateTime<Utc>,
) -> Result<(), ItemError> {
    let record = catalog_record(product, variant, now)?;
    products::upsert_catalog_record(pool, &record).await?;
    Ok(())
}

/// Build the local record for one (product, variant) pair.
fn catalog_record(
    product: &RestProduct,
    variant: &RestVariant,
    now: DateTime<Utc>,
) -> Result<CatalogRecord, ItemError> {
    let price_text = variant.price.as_deref().ok_or(ItemError::MissingPrice)?;
    let price: Decimal = price_text
        .parse()
        .map_err(|_| ItemError::BadPrice(price_text.to_string()))?;

    let description = text::strip_html(product.body_html.as_deref().unwrap_or_default());
    let short_description = text::truncate_chars(&description, text::SHORT_DESCRIPTION_CHARS);

    Ok(CatalogRecord {
        name: text::display_name(&product.title, &variant.title),
        slug: format!("{}-{}", text::slugify(&product.title), variant.id),
        short_description,
        description,
        price,
        image_url: product.images.first().map(|image| image.src.clone()),
        in_stock: variant.inventory_quantity.unwrap_or(0) > 0,
        shopify_product_id: ShopifyProductId::from(product.id),
        shopify_variant_id: ShopifyVariantId::from(variant.id),
        shopify_inventory_item_id: variant.inventory_item_id.map(ShopifyInventoryItemId::from),
        last_synced_at: now,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shopify::rest::RestImage;

    fn pint_variant(id: i64) -> RestVariant {
        RestVariant {
            id,
            title: "Pint".to_string(),
            price: Some("8.50".to_string()),
            inventory_item_id: Some(id + 100),
            inventory_quantity: Some(12),
        }
    }

    fn mango_tango() -> RestProduct {
        RestProduct {
            id: 111,
            title: "Mango Tango".to_string(),
            body_html: Some("<p>Ripe <strong>mango</strong> sorbet.</p>".to_string()),
            variants: vec![RestVariant {
                id: 222,
                title: text::DEFAULT_VARIANT_TITLE.to_string(),
                price: Some("6.50".to_string()),
                inventory_item_id: Some(333),
                inventory_quantity: Some(5),
            }],
            images: vec![RestImage {
                src: "https://cdn.shopify.com/mango.jpg".to_string(),
            }],
        }
    }

    #[test]
    fn test_catalog_record_for_default_variant() {
        let product = mango_tango();
        let record = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();

        assert_eq!(record.name, "Mango Tango");
        assert_eq!(record.slug, "mango-tango-222");
        assert_eq!(record.description, "Ripe mango sorbet.");
        assert_eq!(record.short_description, "Ripe mango sorbet.");
        assert_eq!(record.price, Decimal::new(650, 2));
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://cdn.shopify.com/mango.jpg")
        );
        assert!(record.in_stock);
        assert_eq!(record.shopify_product_id.as_str(), "111");
        assert_eq!(record.shopify_variant_id.as_str(), "222");
        assert_eq!(
            record.shopify_inventory_item_id.as_ref().map(|id| id.as_str()),
            Some("333")
        );
    }

    #[test]
    fn test_catalog_record_qualifies_named_variants() {
        let product = RestProduct {
            id: 40,
            title: "Vanilla Roll".to_string(),
            body_html: None,
            variants: vec![
                RestVariant {
                    title: "Single".to_string(),
                    ..pint_variant(41)
                },
                RestVariant {
                    title: "Six Pack".to_string(),
                    ..pint_variant(42)
                },
            ],
            images: vec![],
        };

        let first = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();
        let second = catalog_record(&product, &product.variants[1], Utc::now()).unwrap();

        assert_eq!(first.name, "Vanilla Roll - Single");
        assert_eq!(second.name, "Vanilla Roll - Six Pack");
        // Same product, distinct slugs via the variant id suffix
        assert_eq!(first.slug, "vanilla-roll-41");
        assert_eq!(second.slug, "vanilla-roll-42");
    }

    #[test]
    fn test_catalog_record_zero_inventory_is_out_of_stock() {
        let mut product = mango_tango();
        product.variants[0].inventory_quantity = Some(0);
        let record = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();
        assert!(!record.in_stock);
    }

    #[test]
    fn test_catalog_record_untracked_inventory_is_out_of_stock() {
        let mut product = mango_tango();
        product.variants[0].inventory_quantity = None;
        let record = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();
        assert!(!record.in_stock);
    }

    #[test]
    fn test_catalog_record_missing_body_html() {
        let mut product = mango_tango();
        product.body_html = None;
        let record = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.short_description, "");
    }

    #[test]
    fn test_catalog_record_truncates_short_description() {
        let mut product = mango_tango();
        product.body_html = Some(format!("<p>{}</p>", "a".repeat(500)));
        let record = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();

        assert_eq!(record.short_description.chars().count(), 200);
        assert_eq!(record.description.chars().count(), 500);
    }

    #[test]
    fn test_catalog_record_no_images_means_null_url() {
        let mut product = mango_tango();
        product.images.clear();
        let record = catalog_record(&product, &product.variants[0], Utc::now()).unwrap();
        assert_eq!(record.image_url, None);
    }

    #[test]
    fn test_catalog_record_rejects_missing_price() {
        let mut product = mango_tango();
        product.variants[0].price = None;
        let result = catalog_record(&product, &product.variants[0], Utc::now());
        assert!(matches!(result, Err(ItemError::MissingPrice)));
    }

    #[test]
    fn test_catalog_record_rejects_unparseable_price() {
        let mut product = mango_tango();
        product.variants[0].price = Some("free".to_string());
        let result = catalog_record(&product, &product.variants[0], Utc::now());
        assert!(matches!(result, Err(ItemError::BadPrice(_))));
    }
}
