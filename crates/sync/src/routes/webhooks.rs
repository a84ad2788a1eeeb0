//! Shopify webhook receiver.
//!
//! Order of operations is load-bearing: the signature is verified over the
//! raw body bytes before any parsing or storage access, and the topic only
//! routes payload handling after authentication succeeds.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::services::webhooks as apply;
use crate::shopify::webhooks::{
    InventoryLevelEvent, ProductDeleteEvent, ProductUpdateEvent, SIGNATURE_HEADER, TOPIC_HEADER,
    WebhookTopic, verify_signature,
};
use crate::state::AppState;

/// Acknowledgement returned for every applied (or deliberately ignored)
/// delivery. Anything else goes through the error envelope.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

/// Receive one signed webhook delivery.
///
/// Unknown topics (and deliveries without a topic header) acknowledge as
/// no-ops, as do events for records the full sync has never created, so
/// Shopify never retries deliveries we cannot use.
#[instrument(skip(state, headers, body))]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing webhook signature".to_string()))?;

    if !verify_signature(
        &state.config().shopify.webhook_secret,
        body.as_bytes(),
        signature,
    ) {
        return Err(AppError::Unauthorized(
            "Invalid webhook signature".to_string(),
        ));
    }

    let topic_header = headers.get(TOPIC_HEADER).and_then(|value| value.to_str().ok());
    let topic = topic_header.map_or(WebhookTopic::Unknown, WebhookTopic::from_header);

    match topic {
        WebhookTopic::ProductsUpdate => {
            let event: ProductUpdateEvent = parse_event(&body)?;
            let outcome = apply::apply_product_update(state.pool(), &event).await?;
            info!(
                product_id = event.id,
                matched = outcome.matched,
                skipped = outcome.skipped,
                "Applied products/update"
            );
        }
        WebhookTopic::InventoryLevelsUpdate => {
            let event: InventoryLevelEvent = parse_event(&body)?;
            let matched = apply::apply_inventory_update(state.pool(), &event).await?;
            info!(
                inventory_item_id = event.inventory_item_id,
                matched, "Applied inventory_levels/update"
            );
        }
        WebhookTopic::ProductsDelete => {
            let event: ProductDeleteEvent = parse_event(&body)?;
            let flagged = apply::apply_product_delete(state.pool(), &event).await?;
            info!(product_id = event.id, flagged, "Applied products/delete");
        }
        WebhookTopic::Unknown => {
            info!(
                topic = topic_header.unwrap_or("<none>"),
                "Ignoring webhook topic with no local effect"
            );
        }
    }

    Ok(Json(WebhookAck { success: true }))
}

/// Parse a verified payload into its topic's schema.
///
/// A payload that does not match the topic's shape is a malformed delivery
/// and is rejected rather than guessed at.
fn parse_event<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|error| AppError::BadRequest(format!("Malformed webhook payload: {error}")))
}
