//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use shelfscope_core::{
    chat,
    models::{Insight, InsightType},
};

/// Query parameters for listing insights
#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    /// Filter by insight type (growth, risk, opportunity)
    #[serde(rename = "type")]
    pub insight_type: Option<String>,
}

/// Narrative summary response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// POST /api/insights/generate - Run the rules (plus augmentation) and return all insights
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Insight>>, AppError> {
    state
        .insight_engine
        .generate(state.repo.as_ref(), state.ai.as_ref())
        .await?;

    Ok(Json(state.repo.list_insights(None).await?))
}

/// GET /api/insights - List stored insights
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightQuery>,
) -> Result<Json<Vec<Insight>>, AppError> {
    let insight_type = match params.insight_type.as_deref() {
        None | Some("") => None,
        Some(t) => Some(
            t.parse::<InsightType>()
                .map_err(|e| AppError::bad_request(&e))?,
        ),
    };

    Ok(Json(state.repo.list_insights(insight_type).await?))
}

/// GET /api/insights/summary - Narrative performance summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, AppError> {
    let summary = chat::performance_summary(state.repo.as_ref(), state.ai.as_ref()).await?;
    Ok(Json(SummaryResponse { summary }))
}
