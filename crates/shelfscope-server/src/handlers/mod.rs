//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod chat;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod metrics;
pub mod segments;
pub mod simulation;

// Re-export all handlers for use in router
pub use chat::*;
pub use forecast::*;
pub use health::*;
pub use insights::*;
pub use metrics::*;
pub use segments::*;
pub use simulation::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;

use crate::{AppError, MAX_BODY_SIZE};

/// Read and deserialize a JSON request body
pub(crate) async fn json_body<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}
