//! Trend and seasonality forecasting
//!
//! The model is deliberately naive: it compounds a fixed monthly trend onto the
//! last observed value, scales by a month-of-year factor, and wraps the result
//! in a symmetric band. No parameters are fitted.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::format::round_half_up;
use crate::models::{ForecastRequest, ForecastResult, NewForecastResult};
use crate::storage::Repository;

/// Scales applied to the latest sales value to build a four-period history
const SALES_VALUE_TAIL: [f64; 4] = [0.85, 0.92, 0.96, 1.0];

/// Scales applied to the latest unit count to build a four-period history
const SALES_UNITS_TAIL: [f64; 4] = [0.87, 0.93, 0.97, 1.0];

/// One projected period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone)]
pub struct ForecastModel {
    config: ForecastConfig,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

impl ForecastModel {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Project `periods` points forward from the last value of `history`
    ///
    /// `as_of` fixes the month of the first projected period; the model never
    /// reads the clock.
    pub fn forecast(
        &self,
        history: &[f64],
        periods: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<ProjectedPoint>> {
        let last = *history
            .last()
            .ok_or_else(|| Error::NotFound("No historical data to forecast from".into()))?;

        let season_len = self.config.seasonality.len();
        let start_month = as_of.month0() as usize;

        let points = (0..periods as usize)
            .map(|i| {
                let seasonal = match season_len {
                    0 => 1.0,
                    n => self.config.seasonality[(start_month + i) % n],
                };
                let trend = (1.0 + self.config.trend).powi(i as i32 + 1);
                let predicted = last * trend * seasonal;
                let half_width = predicted * self.config.noise * self.config.z_score;
                ProjectedPoint {
                    predicted,
                    lower: predicted - half_width,
                    upper: predicted + half_width,
                }
            })
            .collect();

        Ok(points)
    }
}

/// Forecast a UPC's sales value and units and persist one record per period
///
/// Points are written one at a time; a storage failure midway leaves the
/// earlier points stored.
pub async fn generate_forecast(
    repo: &dyn Repository,
    model: &ForecastModel,
    request: &ForecastRequest,
    as_of: NaiveDate,
) -> Result<Vec<ForecastResult>> {
    request.validate()?;

    let snapshot = repo
        .get_snapshot_by_upc(&request.upc)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!("No historical data found for UPC: {}", request.upc))
        })?;

    let sales_history: Vec<f64> = SALES_VALUE_TAIL
        .iter()
        .map(|scale| snapshot.metrics.sales_value * scale)
        .collect();
    let units_history: Vec<f64> = SALES_UNITS_TAIL
        .iter()
        .map(|scale| snapshot.metrics.sales_units * scale)
        .collect();

    let sales = model.forecast(&sales_history, request.periods, as_of)?;
    let units = model.forecast(&units_history, request.periods, as_of)?;

    let mut stored = Vec::with_capacity(sales.len());
    for (i, (sales_point, units_point)) in sales.iter().zip(units.iter()).enumerate() {
        let forecast_date = request
            .date_range
            .start
            .checked_add_months(Months::new(i as u32 + 1))
            .ok_or_else(|| Error::Validation("Forecast date out of range".into()))?;

        let record = NewForecastResult {
            upc: request.upc.clone(),
            forecast_date,
            predicted_sales_value: round_half_up(sales_point.predicted),
            predicted_sales_units: round_half_up(units_point.predicted),
            confidence_lower: round_half_up(sales_point.lower),
            confidence_upper: round_half_up(sales_point.upper),
        };
        debug!(upc = %request.upc, date = %forecast_date, "Storing forecast point");
        stored.push(repo.create_forecast(record).await?);
    }

    info!(upc = %request.upc, count = stored.len(), "Forecast generated");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use crate::storage::{seed_sample_data, MemoryRepository, SAMPLE_UPC};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_produces_requested_number_of_points() {
        let model = ForecastModel::default();
        let points = model.forecast(&[100.0, 110.0], 7, date(2025, 5, 10)).unwrap();
        assert_eq!(points.len(), 7);
        for p in &points {
            assert!(p.lower <= p.predicted && p.predicted <= p.upper);
        }
    }

    #[test]
    fn test_zero_periods_is_empty() {
        let model = ForecastModel::default();
        assert!(model.forecast(&[1.0], 0, date(2025, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_empty_history_is_not_found() {
        let model = ForecastModel::default();
        let err = model.forecast(&[], 3, date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_first_point_uses_as_of_month() {
        let model = ForecastModel::default();
        // July factor is 1.15
        let points = model.forecast(&[1000.0], 1, date(2025, 7, 4)).unwrap();
        let expected = 1000.0 * 1.02 * 1.15;
        assert!((points[0].predicted - expected).abs() < 1e-9);

        let half = expected * 0.05 * 1.96;
        assert!((points[0].upper - (expected + half)).abs() < 1e-9);
        assert!((points[0].lower - (expected - half)).abs() < 1e-9);
    }

    #[test]
    fn test_trend_compounds_between_equal_seasons() {
        let config = ForecastConfig {
            seasonality: vec![1.0; 12],
            ..ForecastConfig::default()
        };
        let model = ForecastModel::new(config);
        let points = model.forecast(&[500.0], 3, date(2025, 1, 1)).unwrap();
        let ratio = points[2].predicted / points[1].predicted;
        assert!((ratio - 1.02).abs() < 1e-12);
    }

    #[test]
    fn test_seasonality_wraps_around_year_end() {
        let model = ForecastModel::default();
        // November, December, then January of the next year
        let points = model.forecast(&[100.0], 3, date(2025, 11, 1)).unwrap();
        let jan = 100.0 * 1.02_f64.powi(3) * 1.0;
        assert!((points[2].predicted - jan).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_generate_forecast_persists_rounded_points() {
        let repo = MemoryRepository::new();
        seed_sample_data(&repo).await.unwrap();

        let request = ForecastRequest {
            upc: SAMPLE_UPC.into(),
            date_range: DateRange {
                start: date(2025, 1, 31),
                end: date(2025, 3, 31),
            },
            periods: 4,
        };
        let results = generate_forecast(&repo, &ForecastModel::default(), &request, date(2025, 4, 1))
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        // April factor is 1.1
        assert_eq!(results[0].predicted_sales_value, (168000.0 * 1.02 * 1.1_f64).round());
        assert_eq!(results[0].predicted_sales_units, (8650.0 * 1.02 * 1.1_f64).round());
        // Month addition clamps to the end of shorter months
        assert_eq!(results[0].forecast_date, date(2025, 2, 28));
        assert_eq!(results[1].forecast_date, date(2025, 3, 31));
        for r in &results {
            assert_eq!(r.predicted_sales_value.fract(), 0.0);
            assert!(r.confidence_lower <= r.predicted_sales_value);
            assert!(r.predicted_sales_value <= r.confidence_upper);
        }

        let stored = repo.list_forecasts(Some(SAMPLE_UPC)).await.unwrap();
        assert_eq!(stored, results);
    }

    #[tokio::test]
    async fn test_generate_forecast_unknown_upc() {
        let repo = MemoryRepository::new();
        let request = ForecastRequest {
            upc: "00000".into(),
            date_range: DateRange {
                start: date(2025, 1, 1),
                end: date(2025, 3, 31),
            },
            periods: 2,
        };
        let err = generate_forecast(&repo, &ForecastModel::default(), &request, date(2025, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(repo.list_forecasts(None).await.unwrap().is_empty());
    }
}
