//! Catalog sync trigger endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::catalog;
use crate::state::AppState;

/// Response for a catalog sync run.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub synced: u32,
    pub errors: u32,
    pub message: String,
}

/// Trigger a full catalog sync.
///
/// Called by operators or a scheduler rather than browsers; the run is
/// synchronous and the response reports what happened. Partial failure is
/// still a 200: the counts tell the story.
#[instrument(skip(state))]
pub async fn trigger(State(state): State<AppState>) -> Result<Json<SyncResponse>> {
    let outcome = catalog::run(state.shopify_admin(), state.pool()).await?;

    Ok(Json(SyncResponse {
        success: true,
        synced: outcome.synced,
        errors: outcome.errors,
        message: format!(
            "Synced {} products, {} errors",
            outcome.synced, outcome.errors
        ),
    }))
}
