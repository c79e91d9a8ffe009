//! Customer segment handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use tracing::info;

use super::json_body;
use crate::{AppError, AppState};
use shelfscope_core::models::{CustomerSegment, SegmentUpdate};

/// GET /api/customer-segments - List all segments
pub async fn list_segments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CustomerSegment>>, AppError> {
    Ok(Json(state.repo.list_segments().await?))
}

/// PATCH /api/customer-segments/:id - Partially update a segment
pub async fn update_segment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<CustomerSegment>, AppError> {
    let update: SegmentUpdate = json_body(request).await?;

    if update.customer_count.is_some_and(|c| c < 0) {
        return Err(AppError::bad_request("customerCount must not be negative"));
    }

    let segment = state.repo.update_segment(id, update).await?;
    info!(id = segment.id, name = %segment.segment_name, "Segment updated");

    Ok(Json(segment))
}
