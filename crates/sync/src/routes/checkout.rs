//! Checkout bridge endpoint.
//!
//! The frontend keeps the cart in local storage; this endpoint exchanges
//! its lines for a hosted Shopify checkout URL.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use sugarpine_core::ShopifyVariantId;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::shopify::CheckoutLine;
use crate::state::AppState;

/// Checkout request: the client's cart lines.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// One cart line as the frontend stores it.
///
/// Items without a variant id (stale local storage from before a product
/// was re-synced) cannot be checked out and are dropped server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub variant_id: Option<String>,
    pub quantity: i64,
}

/// Checkout response carrying the hosted checkout URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub checkout_url: String,
}

/// Create a Shopify checkout from the posted cart lines.
///
/// Rejects carts that are empty after filtering; sending Shopify an empty
/// line list would fail anyway, with a worse message.
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let lines: Vec<CheckoutLine> = request
        .items
        .into_iter()
        .filter_map(|item| {
            item.variant_id.map(|variant_id| CheckoutLine {
                variant_id: ShopifyVariantId::new(variant_id),
                quantity: item.quantity,
            })
        })
        .collect();

    if lines.is_empty() {
        return Err(AppError::BadRequest("No items in cart".to_string()));
    }

    let session = state.shopify_storefront().create_checkout(&lines).await?;
    info!(checkout_id = %session.id, "Checkout created");

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_url: session.web_url,
    }))
}
