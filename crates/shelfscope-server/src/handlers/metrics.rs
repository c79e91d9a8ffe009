//! Metrics snapshot handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use tracing::info;

use super::json_body;
use crate::{AppError, AppState};
use shelfscope_core::models::{MetricsSnapshot, NewMetricsSnapshot};

/// GET /api/nutrition-data - List all snapshots
pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MetricsSnapshot>>, AppError> {
    let snapshots = state.repo.list_snapshots().await?;
    Ok(Json(snapshots))
}

/// GET /api/nutrition-data/:upc - Get the snapshot for one UPC
pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(upc): Path<String>,
) -> Result<Json<MetricsSnapshot>, AppError> {
    let snapshot = state
        .repo
        .get_snapshot_by_upc(&upc)
        .await?
        .ok_or_else(|| AppError::not_found(&format!("No data found for UPC {}", upc)))?;

    Ok(Json(snapshot))
}

/// POST /api/nutrition-data - Insert or replace the snapshot for a UPC
pub async fn upsert_snapshot(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MetricsSnapshot>, AppError> {
    let snapshot: NewMetricsSnapshot = json_body(request).await?;
    snapshot.validate()?;

    let stored = state.repo.upsert_snapshot(snapshot).await?;
    info!(upc = %stored.upc, id = stored.id, "Snapshot stored");

    Ok(Json(stored))
}
