//! Test utilities for shelfscope-core
//!
//! Provides a mock OpenAI-compatible server for exercising the remote text
//! backend without a real model.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// How the mock server answers chat completions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Well-formed replies
    Healthy,
    /// HTTP 500 for every completion
    Failing,
    /// 200 with prose where JSON was requested
    Garbled,
}

/// Mock OpenAI-compatible server for testing
pub struct MockOpenAIServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOpenAIServer {
    /// Start a healthy mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(MockMode::Healthy).await
    }

    /// Start the mock server in the given mode
    pub async fn start_with(mode: MockMode) -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_completion))
            .with_state(mode);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "mock-model", "object": "model"}]
    }))
}

async fn handle_completion(
    State(mode): State<MockMode>,
    Json(request): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if mode == MockMode::Failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let prompt = request["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default();

    let content = if mode == MockMode::Garbled {
        "Sorry, I am not able to format that.".to_string()
    } else if prompt.contains("strategic recommendations") {
        json!({
            "recommendations": [
                {
                    "title": "Regional Sampling Push",
                    "description": "Sample in low-penetration regions.",
                    "impact": "Adds roughly 900 trial customers per quarter."
                },
                {
                    "title": "Subscription Bundles",
                    "description": "Offer auto-ship bundles to loyal buyers.",
                    "impact": "Lifts repeat rate by 4 points."
                }
            ]
        })
        .to_string()
    } else if prompt.contains("performance summary") {
        "Sales are up and penetration is low.".to_string()
    } else {
        "Remote answer: performance is steady.".to_string()
    };

    Ok(Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })))
}
