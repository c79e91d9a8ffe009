//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use shelfscope_core::AIBackend;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub ai: Option<BackendStatus>,
}

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub backend: &'static str,
    pub host: String,
    pub model: String,
    pub healthy: bool,
}

/// GET /api/health - Liveness plus storage and text backend info
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai = match &state.ai {
        Some(client) => Some(BackendStatus {
            backend: client.kind(),
            host: client.host().to_string(),
            model: client.model().to_string(),
            healthy: client.health_check().await,
        }),
        None => None,
    };

    Json(HealthResponse {
        status: "ok",
        storage: state.repo.kind(),
        ai,
    })
}
