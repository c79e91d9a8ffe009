//! What-if simulation handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};

use super::json_body;
use crate::{AppError, AppState};
use shelfscope_core::{
    models::{SimulationRequest, SimulationResult},
    run_simulation,
};

/// POST /api/simulate - Run a scenario against the baseline snapshot
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SimulationResult>, AppError> {
    let req: SimulationRequest = json_body(request).await?;
    let result = run_simulation(state.repo.as_ref(), &state.simulation_engine, &req).await?;
    Ok(Json(result))
}

/// GET /api/simulations - Simulation history, oldest first
pub async fn list_simulations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SimulationResult>>, AppError> {
    Ok(Json(state.repo.list_simulations().await?))
}
