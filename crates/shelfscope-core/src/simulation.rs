//! What-if simulation over price, distribution, and marketing levers
//!
//! Each lever contributes an independent additive factor to projected sales;
//! only distribution expansion and marketing carry a cost.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::format::{round_cents, round_half_up};
use crate::models::{NewSimulationResult, SimulationRequest, SimulationResult};
use crate::storage::Repository;

/// Baseline figures a scenario is measured against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub sales_value: f64,
    pub sales_units: f64,
}

/// Rounded outputs of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub total_factor: f64,
    pub projected_sales_value: f64,
    pub projected_sales_units: f64,
    pub incremental_revenue: f64,
    pub investment_cost: f64,
    pub roi: f64,
}

struct LeverImpact {
    factor: f64,
    cost: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Apply the levers to a baseline (the request is assumed validated)
    pub fn simulate(&self, baseline: Baseline, request: &SimulationRequest) -> SimulationOutcome {
        let price = self.price_impact(request.price_change);
        let distribution = self.distribution_impact(baseline, request.distribution_change);
        let marketing = self.marketing_impact(baseline, request.marketing_spend_change);

        let total_factor = 1.0 + price.factor + distribution.factor + marketing.factor;
        let projected_value = baseline.sales_value * total_factor;
        let projected_units = baseline.sales_units * total_factor;

        let incremental = projected_value - baseline.sales_value;
        let cost = price.cost + distribution.cost + marketing.cost;
        let roi = if cost > 0.0 { incremental / cost } else { 0.0 };

        SimulationOutcome {
            total_factor,
            projected_sales_value: round_half_up(projected_value),
            projected_sales_units: round_half_up(projected_units),
            incremental_revenue: round_half_up(incremental),
            investment_cost: round_half_up(cost),
            roi: round_cents(roi),
        }
    }

    fn price_impact(&self, price_change: f64) -> LeverImpact {
        LeverImpact {
            factor: (price_change / 100.0) * self.config.price_elasticity,
            cost: 0.0,
        }
    }

    fn distribution_impact(&self, baseline: Baseline, distribution_change: f64) -> LeverImpact {
        LeverImpact {
            factor: (distribution_change / 100.0) * self.config.distribution_impact,
            // Contraction is free; only expansion costs
            cost: distribution_change.max(0.0)
                * baseline.sales_value
                * self.config.distribution_cost_rate,
        }
    }

    fn marketing_impact(&self, baseline: Baseline, marketing_change: f64) -> LeverImpact {
        LeverImpact {
            factor: (marketing_change / 100.0) * self.config.marketing_efficiency,
            cost: (marketing_change / 100.0) * baseline.sales_value * self.config.marketing_cost_rate,
        }
    }
}

/// Run a scenario against the first stored snapshot and persist it
pub async fn run_simulation(
    repo: &dyn Repository,
    engine: &SimulationEngine,
    request: &SimulationRequest,
) -> Result<SimulationResult> {
    request.validate()?;

    let snapshot = repo
        .list_snapshots()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound("No baseline data available for simulation".into()))?;

    let baseline = Baseline {
        sales_value: snapshot.metrics.sales_value,
        sales_units: snapshot.metrics.sales_units,
    };
    let outcome = engine.simulate(baseline, request);

    let stored = repo
        .create_simulation(NewSimulationResult {
            scenario_name: format!("Simulation_{}", Utc::now().timestamp_millis()),
            price_change: request.price_change,
            distribution_change: request.distribution_change,
            marketing_spend_change: request.marketing_spend_change,
            projected_sales_value: outcome.projected_sales_value,
            projected_sales_units: outcome.projected_sales_units,
            incremental_revenue: outcome.incremental_revenue,
            investment_cost: outcome.investment_cost,
            roi: outcome.roi,
        })
        .await?;

    info!(
        scenario = %stored.scenario_name,
        incremental = stored.incremental_revenue,
        roi = stored.roi,
        "Simulation complete"
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{seed_sample_data, MemoryRepository};

    const SAMPLE: Baseline = Baseline {
        sales_value: 168000.0,
        sales_units: 8650.0,
    };

    #[test]
    fn test_zero_levers_are_neutral() {
        let outcome = SimulationEngine::default().simulate(SAMPLE, &SimulationRequest::new(0.0, 0.0, 0.0));
        assert_eq!(outcome.total_factor, 1.0);
        assert_eq!(outcome.projected_sales_value, 168000.0);
        assert_eq!(outcome.incremental_revenue, 0.0);
        assert_eq!(outcome.investment_cost, 0.0);
        assert_eq!(outcome.roi, 0.0);
    }

    #[test]
    fn test_price_increase_reduces_sales_without_cost() {
        let outcome =
            SimulationEngine::default().simulate(SAMPLE, &SimulationRequest::new(10.0, 0.0, 0.0));
        assert_eq!(outcome.projected_sales_value, 154560.0);
        assert_eq!(outcome.projected_sales_units, 7958.0);
        assert_eq!(outcome.incremental_revenue, -13440.0);
        assert_eq!(outcome.investment_cost, 0.0);
        assert_eq!(outcome.roi, 0.0);
    }

    #[test]
    fn test_distribution_contraction_is_free() {
        let outcome =
            SimulationEngine::default().simulate(SAMPLE, &SimulationRequest::new(0.0, -10.0, 0.0));
        assert_eq!(outcome.investment_cost, 0.0);
        assert_eq!(outcome.incremental_revenue, -10080.0);
        assert_eq!(outcome.roi, 0.0);
    }

    #[test]
    fn test_marketing_spend_roi() {
        let outcome =
            SimulationEngine::default().simulate(SAMPLE, &SimulationRequest::new(0.0, 0.0, 20.0));
        // factor 0.06, cost 0.2 * 168000 * 0.05
        assert_eq!(outcome.incremental_revenue, 10080.0);
        assert_eq!(outcome.investment_cost, 1680.0);
        assert_eq!(outcome.roi, 6.0);
    }

    #[test]
    fn test_combined_levers() {
        let outcome =
            SimulationEngine::default().simulate(SAMPLE, &SimulationRequest::new(-5.0, 10.0, 10.0));
        // 1 + 0.04 + 0.06 + 0.03
        assert!((outcome.total_factor - 1.13).abs() < 1e-12);
        assert_eq!(outcome.projected_sales_value, 189840.0);
        // 10 * 168000 * 0.02 + 0.1 * 168000 * 0.05
        assert_eq!(outcome.investment_cost, 34440.0);
        assert_eq!(outcome.roi, 0.63);
    }

    #[test]
    fn test_negative_roi_tie_rounds_toward_positive() {
        let outcome =
            SimulationEngine::default().simulate(SAMPLE, &SimulationRequest::new(8.5, 8.0, 0.0));
        // -3360 / 26880 = -0.125
        assert_eq!(outcome.incremental_revenue, -3360.0);
        assert_eq!(outcome.investment_cost, 26880.0);
        assert_eq!(outcome.roi, -0.12);
    }

    #[tokio::test]
    async fn test_run_simulation_persists_scenario() {
        let repo = MemoryRepository::new();
        seed_sample_data(&repo).await.unwrap();

        let result = run_simulation(
            &repo,
            &SimulationEngine::default(),
            &SimulationRequest::new(10.0, 0.0, 0.0),
        )
        .await
        .unwrap();

        assert!(result.scenario_name.starts_with("Simulation_"));
        assert_eq!(result.projected_sales_value, 154560.0);
        assert_eq!(repo.list_simulations().await.unwrap(), vec![result]);
    }

    #[tokio::test]
    async fn test_run_simulation_without_baseline() {
        let repo = MemoryRepository::new();
        let err = run_simulation(
            &repo,
            &SimulationEngine::default(),
            &SimulationRequest::new(0.0, 0.0, 0.0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_run_simulation_rejects_out_of_range() {
        let repo = MemoryRepository::new();
        seed_sample_data(&repo).await.unwrap();
        let err = run_simulation(
            &repo,
            &SimulationEngine::default(),
            &SimulationRequest::new(25.0, 0.0, 0.0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(repo.list_simulations().await.unwrap().is_empty());
    }
}
