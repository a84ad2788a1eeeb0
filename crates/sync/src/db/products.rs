//! Write operations on the mirrored `products` table.
//!
//! Every statement here is a single idempotent overwrite of sync-owned
//! columns. There is no read-modify-write, so replaying a sync or a
//! webhook converges on the same row state (last write wins).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sugarpine_core::{ShopifyInventoryItemId, ShopifyProductId};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::RepositoryError;
use crate::models::{CatalogRecord, ListingUpdate};

/// Insert or refresh one (product, variant) record, keyed by the Shopify
/// variant id.
///
/// `slug` is written on insert only. Once a product page URL exists it
/// must not change because Shopify retitled the product.
///
/// # Errors
///
/// Returns error if the database write fails.
#[instrument(skip(pool, record), fields(variant = %record.shopify_variant_id))]
pub async fn upsert_catalog_record(
    pool: &PgPool,
    record: &CatalogRecord,
) -> Result<Uuid, RepositoryError> {
    let row: (Uuid,) = sqlx::query_as(
        r"
        INSERT INTO products
            (name, slug, short_description, description, price, image_url, in_stock,
             shopify_product_id, shopify_variant_id, shopify_inventory_item_id, last_synced_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (shopify_variant_id) DO UPDATE SET
            name = EXCLUDED.name,
            short_description = EXCLUDED.short_description,
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            image_url = EXCLUDED.image_url,
            in_stock = EXCLUDED.in_stock,
            shopify_product_id = EXCLUDED.shopify_product_id,
            shopify_inventory_item_id = EXCLUDED.shopify_inventory_item_id,
            last_synced_at = EXCLUDED.last_synced_at
        RETURNING id
        ",
    )
    .bind(&record.name)
    .bind(&record.slug)
    .bind(&record.short_description)
    .bind(&record.description)
    .bind(record.price)
    .bind(&record.image_url)
    .bind(record.in_stock)
    .bind(&record.shopify_product_id)
    .bind(&record.shopify_variant_id)
    .bind(&record.shopify_inventory_item_id)
    .bind(record.last_synced_at)
    .fetch_one(pool)
    .await?;

    debug!(id = %row.0, "Upserted catalog record");
    Ok(row.0)
}

/// Apply a `products/update` patch to the record matching the variant id.
///
/// Returns whether a record matched. Variants we have never synced are
/// skipped, not created: webhook payloads lack the descriptions a full
/// record needs, and the next full sync will pick them up.
///
/// # Errors
///
/// Returns error if the database write fails.
#[instrument(skip(pool, update), fields(variant = %update.shopify_variant_id))]
pub async fn apply_listing_update(
    pool: &PgPool,
    update: &ListingUpdate,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products SET
            name = $2,
            price = $3,
            in_stock = $4,
            image_url = $5,
            last_synced_at = $6
        WHERE shopify_variant_id = $1
        ",
    )
    .bind(&update.shopify_variant_id)
    .bind(&update.name)
    .bind(update.price)
    .bind(update.in_stock)
    .bind(&update.image_url)
    .bind(update.last_synced_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the stock flag for the record matching the Shopify inventory item id.
///
/// Returns whether a record matched.
///
/// # Errors
///
/// Returns error if the database write fails.
#[instrument(skip(pool, inventory_item_id), fields(item = %inventory_item_id))]
pub async fn set_stock_by_inventory_item(
    pool: &PgPool,
    inventory_item_id: &ShopifyInventoryItemId,
    in_stock: bool,
    synced_at: DateTime<Utc>,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products SET
            in_stock = $2,
            last_synced_at = $3
        WHERE shopify_inventory_item_id = $1
        ",
    )
    .bind(inventory_item_id)
    .bind(in_stock)
    .bind(synced_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Flag every record sharing the Shopify product id as out of stock.
///
/// Deletions are tombstones: rows stay so that curated content and slugs
/// survive, and `last_synced_at` is left alone because no Shopify field
/// data was written. Returns the number of records flagged.
///
/// # Errors
///
/// Returns error if the database write fails.
#[instrument(skip(pool, product_id), fields(product = %product_id))]
pub async fn flag_product_out_of_stock(
    pool: &PgPool,
    product_id: &ShopifyProductId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE products SET
            in_stock = FALSE
        WHERE shopify_product_id = $1
        ",
    )
    .bind(product_id)
    .execute(pool)
    .await?;

    debug!(flagged = result.rows_affected(), "Flagged product out of stock");
    Ok(result.rows_affected())
}
