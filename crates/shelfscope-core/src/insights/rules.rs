//! Built-in threshold rules
//!
//! Each rule inspects the current snapshot (and segments) and yields at most
//! one finding.

use crate::ai::BusinessContext;
use crate::format::{plain, thousands};
use crate::models::{InsightType, NewInsight};

use super::engine::InsightRule;

/// Sales value above this marks strong performance
pub const STRONG_SALES_THRESHOLD: f64 = 150_000.0;
/// Customer penetration (%) below this is a risk
pub const LOW_PENETRATION_THRESHOLD: f64 = 15.0;
/// Fewer loyal customers than this is an opportunity
pub const SMALL_LOYAL_BASE_THRESHOLD: i64 = 1000;
/// At-Risk churn (%) above this is a risk
pub const HIGH_CHURN_THRESHOLD: f64 = 25.0;
/// Basket penetration (%) above this signals cross-selling potential
pub const CROSS_CATEGORY_THRESHOLD: f64 = 25.0;

pub struct StrongSalesRule;

impl InsightRule for StrongSalesRule {
    fn name(&self) -> &'static str {
        "strong_sales"
    }

    fn evaluate(&self, ctx: &BusinessContext<'_>) -> Option<NewInsight> {
        let sales = ctx.metrics.sales_value;
        (sales > STRONG_SALES_THRESHOLD).then(|| {
            NewInsight::new(
                InsightType::Growth,
                "Strong Sales Performance",
                format!(
                    "Sales value of ${} indicates strong market performance, driven by effective \
                     pricing strategy and product positioning.",
                    thousands(sales)
                ),
                "Expand distribution to capitalize on momentum",
                0.9,
            )
        })
    }
}

pub struct LowPenetrationRule;

impl InsightRule for LowPenetrationRule {
    fn name(&self) -> &'static str {
        "low_penetration"
    }

    fn evaluate(&self, ctx: &BusinessContext<'_>) -> Option<NewInsight> {
        let penetration = ctx.metrics.customer_penetration_pct;
        (penetration < LOW_PENETRATION_THRESHOLD).then(|| {
            NewInsight::new(
                InsightType::Risk,
                "Low Customer Penetration",
                format!(
                    "Customer penetration at {}% is below industry benchmark, indicating potential \
                     market saturation or competitive pressure.",
                    plain(penetration)
                ),
                "Launch customer acquisition campaign targeting new demographics",
                0.85,
            )
        })
    }
}

pub struct LoyaltyProgramRule;

impl InsightRule for LoyaltyProgramRule {
    fn name(&self) -> &'static str {
        "loyalty_program"
    }

    fn evaluate(&self, ctx: &BusinessContext<'_>) -> Option<NewInsight> {
        let loyal = ctx.segment("Loyal")?;
        (loyal.customer_count < SMALL_LOYAL_BASE_THRESHOLD).then(|| {
            NewInsight::new(
                InsightType::Opportunity,
                "Loyalty Program Enhancement",
                format!(
                    "Only {} loyal customers represent significant upside potential for retention programs.",
                    thousands(loyal.customer_count as f64)
                ),
                "Implement tiered loyalty program with premium benefits",
                0.75,
            )
        })
    }
}

pub struct ChurnRiskRule;

impl InsightRule for ChurnRiskRule {
    fn name(&self) -> &'static str {
        "churn_risk"
    }

    fn evaluate(&self, ctx: &BusinessContext<'_>) -> Option<NewInsight> {
        let at_risk = ctx.segment("At-Risk")?;
        (at_risk.churn_risk_pct > HIGH_CHURN_THRESHOLD).then(|| {
            NewInsight::new(
                InsightType::Risk,
                "High Churn Risk Segment",
                format!(
                    "{}% churn risk in At-Risk segment threatens {} customers.",
                    plain(at_risk.churn_risk_pct),
                    thousands(at_risk.customer_count as f64)
                ),
                "Deploy targeted retention campaigns with personalized offers",
                0.9,
            )
        })
    }
}

pub struct CrossCategoryRule;

impl InsightRule for CrossCategoryRule {
    fn name(&self) -> &'static str {
        "cross_category"
    }

    fn evaluate(&self, ctx: &BusinessContext<'_>) -> Option<NewInsight> {
        let basket = ctx.metrics.basket_penetration_pct;
        (basket > CROSS_CATEGORY_THRESHOLD).then(|| {
            NewInsight::new(
                InsightType::Opportunity,
                "Cross-Category Potential",
                format!(
                    "High basket penetration ({}%) indicates strong cross-selling opportunities in \
                     treats and accessories.",
                    plain(basket)
                ),
                "Test bundle promotions and cross-category displays",
                0.8,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerSegment, RetailMetrics};
    use crate::storage::sample_metrics;

    fn segment(name: &str, count: i64, churn: f64) -> CustomerSegment {
        CustomerSegment {
            id: 1,
            segment_name: name.into(),
            customer_count: count,
            avg_spend: 10.0,
            purchase_frequency: 1.0,
            churn_risk_pct: churn,
            cltv: 50.0,
        }
    }

    #[test]
    fn test_strong_sales_threshold_is_exclusive() {
        let mut metrics = RetailMetrics {
            sales_value: 150_000.0,
            ..Default::default()
        };
        assert!(StrongSalesRule
            .evaluate(&BusinessContext::new(&metrics, &[]))
            .is_none());

        metrics.sales_value = 168_000.0;
        let insight = StrongSalesRule
            .evaluate(&BusinessContext::new(&metrics, &[]))
            .unwrap();
        assert_eq!(insight.insight_type, InsightType::Growth);
        assert!(insight.description.starts_with("Sales value of $168,000 indicates"));
    }

    #[test]
    fn test_low_penetration_description() {
        let metrics = sample_metrics();
        let insight = LowPenetrationRule
            .evaluate(&BusinessContext::new(&metrics, &[]))
            .unwrap();
        assert_eq!(insight.confidence, 0.85);
        assert!(insight.description.starts_with("Customer penetration at 13.6% is below"));
    }

    #[test]
    fn test_segment_rules_need_named_segment() {
        let metrics = sample_metrics();
        let ctx = BusinessContext::new(&metrics, &[]);
        assert!(LoyaltyProgramRule.evaluate(&ctx).is_none());
        assert!(ChurnRiskRule.evaluate(&ctx).is_none());
    }

    #[test]
    fn test_loyal_segment_of_809_is_opportunity() {
        let metrics = RetailMetrics::default();
        let segments = vec![segment("Loyal", 809, 8.1)];
        let insight = LoyaltyProgramRule
            .evaluate(&BusinessContext::new(&metrics, &segments))
            .unwrap();
        assert_eq!(insight.insight_type, InsightType::Opportunity);
        assert_eq!(
            insight.description,
            "Only 809 loyal customers represent significant upside potential for retention programs."
        );
    }

    #[test]
    fn test_at_risk_churn_is_risk() {
        let metrics = RetailMetrics::default();
        let segments = vec![segment("At-Risk", 2261, 28.7)];
        let insight = ChurnRiskRule
            .evaluate(&BusinessContext::new(&metrics, &segments))
            .unwrap();
        assert_eq!(insight.insight_type, InsightType::Risk);
        assert_eq!(
            insight.description,
            "28.7% churn risk in At-Risk segment threatens 2,261 customers."
        );

        let calm = vec![segment("At-Risk", 2261, 25.0)];
        assert!(ChurnRiskRule
            .evaluate(&BusinessContext::new(&metrics, &calm))
            .is_none());
    }
}
