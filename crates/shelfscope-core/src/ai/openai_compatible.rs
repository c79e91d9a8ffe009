//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API
//! (vLLM, LocalAI, llama-server, hosted OpenAI, and so on).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::{plain, thousands};

use super::parsing::parse_recommendations;
use super::types::{BusinessContext, StrategicRecommendation};
use super::AIBackend;

const SYSTEM_PROMPT: &str = "You are a retail analytics assistant for a consumer packaged goods \
     brand. Answer concisely using only the figures provided.";

/// Backend for any server implementing `/v1/chat/completions`
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-3.5-turbo)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let mut backend = Self::new(&host, &model);
        backend.api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();
        Some(backend)
    }

    /// Make a chat completion request
    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.2),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("OpenAI API error {}: {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Backend("No response from OpenAI API".into()))
    }
}

/// Render the metrics a prompt reasons over
fn describe_context(ctx: &BusinessContext<'_>) -> String {
    let m = ctx.metrics;
    let mut lines = vec![
        format!("Sales value: ${}", thousands(m.sales_value)),
        format!("Sales units: {}", thousands(m.sales_units)),
        format!("Average price per unit: ${}", plain(m.average_price_per_unit)),
        format!(
            "ACV weighted distribution: {}%",
            plain(m.acv_weighted_ros_distribution_pct)
        ),
        format!("Stores selling: {}", m.stores_selling),
        format!("Customer penetration: {}%", plain(m.customer_penetration_pct)),
        format!("Loyal penetration: {}%", plain(m.loyal_penetration_pct)),
        format!("Basket penetration: {}%", plain(m.basket_penetration_pct)),
        format!("Repeat rate: {}%", plain(m.repeat_rate_pct)),
        format!(
            "Category share: {}% of spend, {}% of units",
            plain(m.category_share_spend_pct),
            plain(m.category_share_units_pct)
        ),
    ];

    for segment in ctx.segments {
        lines.push(format!(
            "Segment {}: {} customers, ${} avg spend, {}% churn risk, ${} CLTV",
            segment.segment_name,
            segment.customer_count,
            plain(segment.avg_spend),
            plain(segment.churn_risk_pct),
            plain(segment.cltv)
        ));
    }

    lines.join("\n")
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn strategic_recommendations(
        &self,
        ctx: &BusinessContext<'_>,
    ) -> Result<Vec<StrategicRecommendation>> {
        let prompt = format!(
            "Given these quarterly retail metrics:\n{}\n\n\
             Suggest up to three strategic recommendations. Respond with JSON only: \
             {{\"recommendations\": [{{\"title\": \"...\", \"description\": \"...\", \"impact\": \"...\"}}]}}",
            describe_context(ctx)
        );

        let response = self.chat_completion(&prompt).await?;
        debug!("OpenAI-compatible response: {}", response);

        parse_recommendations(&response)
    }

    async fn performance_summary(&self, ctx: &BusinessContext<'_>) -> Result<String> {
        let prompt = format!(
            "Given these quarterly retail metrics:\n{}\n\n\
             Write a three-sentence performance summary covering the sales trend, \
             market penetration, and customer loyalty.",
            describe_context(ctx)
        );

        let response = self.chat_completion(&prompt).await?;
        Ok(response.trim().to_string())
    }

    async fn answer_question(&self, question: &str, ctx: &BusinessContext<'_>) -> Result<String> {
        let prompt = format!(
            "Quarterly retail metrics:\n{}\n\nQuestion: {}",
            describe_context(ctx),
            question
        );

        let response = self.chat_completion(&prompt).await?;
        let answer = response.trim();
        if answer.is_empty() {
            return Err(Error::Backend("Empty answer from OpenAI API".into()));
        }
        Ok(answer.to_string())
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sample_metrics;

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/", "llama");
        assert_eq!(backend.host(), "http://localhost:8080");
        assert_eq!(backend.model(), "llama");
    }

    #[test]
    fn test_describe_context_includes_key_figures() {
        let metrics = sample_metrics();
        let text = describe_context(&BusinessContext::new(&metrics, &[]));
        assert!(text.contains("Sales value: $168,000"));
        assert!(text.contains("Customer penetration: 13.6%"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unhealthy() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "m");
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_recommendations_from_mock_server() {
        use crate::test_utils::MockOpenAIServer;

        let mut server = MockOpenAIServer::start().await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "mock-model", "secret");
        assert!(backend.health_check().await);

        let metrics = sample_metrics();
        let ctx = BusinessContext::new(&metrics, &[]);
        let recs = backend.strategic_recommendations(&ctx).await.unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Regional Sampling Push");

        let answer = backend.answer_question("How are we doing?", &ctx).await.unwrap();
        assert_eq!(answer, "Remote answer: performance is steady.");

        server.stop();
    }

    #[tokio::test]
    async fn test_server_error_surfaces_as_backend_error() {
        use crate::test_utils::{MockMode, MockOpenAIServer};

        let server = MockOpenAIServer::start_with(MockMode::Failing).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "mock-model");

        let metrics = sample_metrics();
        let err = backend
            .performance_summary(&BusinessContext::new(&metrics, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[tokio::test]
    async fn test_garbled_reply_is_invalid_data() {
        use crate::test_utils::{MockMode, MockOpenAIServer};

        let server = MockOpenAIServer::start_with(MockMode::Garbled).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "mock-model");

        let metrics = sample_metrics();
        let err = backend
            .strategic_recommendations(&BusinessContext::new(&metrics, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
