//! Insight Engine - evaluates rules and persists findings

use tracing::{debug, info, warn};

use crate::ai::{AIBackend, AIClient, BusinessContext};
use crate::error::{Error, Result};
use crate::models::{Insight, InsightType, NewInsight};
use crate::storage::Repository;

use super::rules::{
    ChurnRiskRule, CrossCategoryRule, LowPenetrationRule, LoyaltyProgramRule, StrongSalesRule,
};

/// Confidence given to backend-sourced recommendations
pub const AUGMENTED_CONFIDENCE: f64 = 0.8;

/// A threshold rule over the current snapshot and segments
pub trait InsightRule: Send + Sync {
    /// Stable identifier (for logging)
    fn name(&self) -> &'static str;

    /// Produce a finding when the rule's predicate holds
    fn evaluate(&self, ctx: &BusinessContext<'_>) -> Option<NewInsight>;
}

/// Ordered rule set; every matching rule fires
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules, in evaluation order
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(StrongSalesRule));
        engine.register(Box::new(LowPenetrationRule));
        engine.register(Box::new(LoyaltyProgramRule));
        engine.register(Box::new(ChurnRiskRule));
        engine.register(Box::new(CrossCategoryRule));

        engine
    }

    /// Append a rule (evaluated after the existing ones)
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate every rule without persisting anything
    pub fn evaluate(&self, ctx: &BusinessContext<'_>) -> Vec<NewInsight> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let finding = rule.evaluate(ctx);
                debug!(rule = rule.name(), fired = finding.is_some(), "Rule evaluated");
                finding
            })
            .collect()
    }

    /// Evaluate against the first stored snapshot and persist the findings
    ///
    /// When a backend is given, its strategic recommendations are stored as
    /// extra opportunity insights. A backend failure is logged and skipped.
    /// Returns only the insights created by this call; `POST /api/insights/generate`
    /// responds with every stored insight instead.
    pub async fn generate(
        &self,
        repo: &dyn Repository,
        ai: Option<&AIClient>,
    ) -> Result<Vec<Insight>> {
        let snapshot = repo
            .list_snapshots()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("No metrics data available".into()))?;
        let segments = repo.list_segments().await?;
        let ctx = BusinessContext::new(&snapshot.metrics, &segments);

        let mut created = Vec::new();
        for finding in self.evaluate(&ctx) {
            created.push(repo.create_insight(finding).await?);
        }
        let rule_count = created.len();

        if let Some(client) = ai {
            match client.strategic_recommendations(&ctx).await {
                Ok(recommendations) => {
                    for rec in recommendations {
                        let insight = NewInsight::new(
                            InsightType::Opportunity,
                            rec.title,
                            rec.description,
                            rec.impact.clone(),
                            AUGMENTED_CONFIDENCE,
                        )
                        .with_impact(rec.impact);
                        created.push(repo.create_insight(insight).await?);
                    }
                }
                Err(e) => {
                    warn!(
                        backend = client.kind(),
                        error = %e,
                        "Strategic recommendations failed, keeping rule-based insights only"
                    );
                }
            }
        }

        info!(
            upc = %snapshot.upc,
            rules = rule_count,
            augmented = created.len() - rule_count,
            "Insights generated"
        );
        Ok(created)
    }
}
