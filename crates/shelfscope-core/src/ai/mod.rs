//! Pluggable text backend abstraction
//!
//! Recommendations, summaries, and chat answers all go through one
//! backend-agnostic interface.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all text operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (mock, openai_compatible, none). Default: mock
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all text backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Suggest up to three strategic recommendations
    async fn strategic_recommendations(
        &self,
        ctx: &BusinessContext<'_>,
    ) -> Result<Vec<StrategicRecommendation>>;

    /// Narrative summary of current performance
    async fn performance_summary(&self, ctx: &BusinessContext<'_>) -> Result<String>;

    /// Answer a free-form question about the data
    async fn answer_question(&self, question: &str, ctx: &BusinessContext<'_>) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete text client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Template backend
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `mock` (default): template responses, no network
    /// - `openai_compatible`: uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `none` / `off`: no backend (insight augmentation is skipped)
    ///
    /// Returns None when disabled or when the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "mock".to_string());

        match backend.to_lowercase().as_str() {
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                let client = OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible);
                if client.is_none() {
                    tracing::warn!(
                        "AI_BACKEND=openai_compatible but OPENAI_COMPATIBLE_HOST is not set"
                    );
                }
                client
            }
            "none" | "off" | "disabled" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to mock");
                Some(AIClient::Mock(MockBackend::new()))
            }
        }
    }

    /// Create an OpenAI-compatible backend directly
    pub fn openai_compatible(host: &str, model: &str) -> Self {
        AIClient::OpenAICompatible(OpenAICompatibleBackend::new(host, model))
    }

    /// Create a mock backend
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Short backend name (for health output)
    pub fn kind(&self) -> &'static str {
        match self {
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn strategic_recommendations(
        &self,
        ctx: &BusinessContext<'_>,
    ) -> Result<Vec<StrategicRecommendation>> {
        match self {
            AIClient::OpenAICompatible(b) => b.strategic_recommendations(ctx).await,
            AIClient::Mock(b) => b.strategic_recommendations(ctx).await,
        }
    }

    async fn performance_summary(&self, ctx: &BusinessContext<'_>) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.performance_summary(ctx).await,
            AIClient::Mock(b) => b.performance_summary(ctx).await,
        }
    }

    async fn answer_question(&self, question: &str, ctx: &BusinessContext<'_>) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.answer_question(question, ctx).await,
            AIClient::Mock(b) => b.answer_question(question, ctx).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
