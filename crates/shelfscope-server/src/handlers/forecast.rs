//! Forecast handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::json_body;
use crate::{AppError, AppState};
use shelfscope_core::{
    generate_forecast,
    models::{ForecastRequest, ForecastResult},
};

/// Query parameters for listing forecasts
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub upc: Option<String>,
}

/// POST /api/forecast - Project a UPC forward and store the points
///
/// Seasonality is anchored at the current month.
pub async fn create_forecast(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<ForecastResult>>, AppError> {
    let req: ForecastRequest = json_body(request).await?;
    let as_of = Utc::now().date_naive();

    let points = generate_forecast(state.repo.as_ref(), &state.forecast_model, &req, as_of).await?;

    Ok(Json(points))
}

/// GET /api/forecast - List stored forecast points
pub async fn list_forecasts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<Vec<ForecastResult>>, AppError> {
    let upc = params.upc.as_deref().filter(|u| !u.is_empty());
    let points = state.repo.list_forecasts(upc).await?;
    Ok(Json(points))
}
