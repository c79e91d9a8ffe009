//! Chat handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::{AppError, AppState};
use shelfscope_core::chat;

/// Request body for a chat question
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// POST /api/chat - Answer a question about the current data
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ChatResponse>, AppError> {
    let req: ChatRequest = json_body(request).await?;
    let answer = chat::answer_question(state.repo.as_ref(), state.ai.as_ref(), &req.question).await?;
    Ok(Json(ChatResponse { answer }))
}
