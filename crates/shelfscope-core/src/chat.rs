//! Question answering and performance summaries over the stored data
//!
//! A configured backend is tried first; any failure (or no backend at all)
//! falls back to the template responder so callers always get an answer.

use tracing::warn;

use crate::ai::{AIBackend, AIClient, BusinessContext, MockBackend};
use crate::error::{Error, Result};
use crate::models::{CustomerSegment, RetailMetrics};
use crate::storage::{sample_metrics, Repository};

/// Longest question accepted, in characters
pub const MAX_QUESTION_LEN: usize = 2000;

/// Current metrics and segments; the sample metrics stand in when no snapshot exists
async fn load_context(repo: &dyn Repository) -> Result<(RetailMetrics, Vec<CustomerSegment>)> {
    let metrics = repo
        .list_snapshots()
        .await?
        .into_iter()
        .next()
        .map(|s| s.metrics)
        .unwrap_or_else(sample_metrics);
    let segments = repo.list_segments().await?;
    Ok((metrics, segments))
}

/// Answer a free-form question about the current data
pub async fn answer_question(
    repo: &dyn Repository,
    ai: Option<&AIClient>,
    question: &str,
) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::Validation("Question is required".into()));
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(Error::Validation(format!(
            "Question must be at most {} characters",
            MAX_QUESTION_LEN
        )));
    }

    let (metrics, segments) = load_context(repo).await?;
    let ctx = BusinessContext::new(&metrics, &segments);

    if let Some(client) = ai {
        match client.answer_question(question, &ctx).await {
            Ok(answer) => return Ok(answer),
            Err(e) => {
                warn!(backend = client.kind(), error = %e, "Chat backend failed, using templates");
            }
        }
    }

    Ok(MockBackend::new().answer(question, &ctx))
}

/// Narrative summary of current performance
pub async fn performance_summary(repo: &dyn Repository, ai: Option<&AIClient>) -> Result<String> {
    let (metrics, segments) = load_context(repo).await?;
    let ctx = BusinessContext::new(&metrics, &segments);

    if let Some(client) = ai {
        match client.performance_summary(&ctx).await {
            Ok(summary) => return Ok(summary),
            Err(e) => {
                warn!(backend = client.kind(), error = %e, "Summary backend failed, using templates");
            }
        }
    }

    Ok(MockBackend::new().summary(&ctx))
}
