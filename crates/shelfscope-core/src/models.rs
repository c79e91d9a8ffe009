//! Domain models for Shelfscope
//!
//! Field names serialize as camelCase to match the dashboard's JSON contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of forecast periods used when a request does not specify one
pub const DEFAULT_FORECAST_PERIODS: u32 = 4;

/// Upper bound on forecast periods accepted from callers
pub const MAX_FORECAST_PERIODS: u32 = 120;

/// Retail performance measures reported for one product over one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailMetrics {
    /// ACV-weighted distribution across stores with a rate of sale
    pub acv_weighted_ros_distribution_pct: f64,
    pub acv_weighted_ros_sales: f64,
    pub acv_weighted_ros_units: f64,
    pub associated_category_spend: f64,
    pub associated_category_spend_per_transaction: f64,
    pub associated_retailer_spend: f64,
    pub associated_retailer_spend_per_transaction: f64,
    pub average_price_per_unit: f64,
    /// Share of baskets that contained the product
    pub basket_penetration_pct: f64,
    pub category_share_spend_pct: f64,
    pub category_share_units_pct: f64,
    /// Share of potential customers who bought in the period
    pub customer_penetration_pct: f64,
    pub customers: i64,
    pub discontinued_products_sales_value: f64,
    pub frequency_of_purchase: f64,
    pub loyal_penetration_pct: f64,
    pub repeat_rate_pct: f64,
    pub new_products_sales_value: f64,
    pub number_of_products: i64,
    pub retailer_customers: i64,
    pub retailer_transactions: i64,
    pub sales_per_store: f64,
    pub sales_unit_continuous_products: f64,
    pub sales_units: f64,
    pub sales_value: f64,
    pub stores_selling: i64,
    pub transactions: i64,
    pub spend_per_customer: f64,
    pub spend_per_loyal_customer: f64,
    pub spend_per_transaction: f64,
    pub units_per_customer: f64,
    pub units_per_store: f64,
    pub units_per_transaction: f64,
}

/// A stored metrics snapshot for one UPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub id: i64,
    pub upc: String,
    pub report_start_date: NaiveDate,
    pub report_end_date: NaiveDate,
    #[serde(flatten)]
    pub metrics: RetailMetrics,
}

/// A metrics snapshot to upsert (keyed by UPC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMetricsSnapshot {
    pub upc: String,
    pub report_start_date: NaiveDate,
    pub report_end_date: NaiveDate,
    #[serde(flatten)]
    pub metrics: RetailMetrics,
}

impl NewMetricsSnapshot {
    pub fn validate(&self) -> Result<()> {
        if self.upc.trim().is_empty() {
            return Err(Error::Validation("UPC must not be empty".into()));
        }
        if self.report_end_date < self.report_start_date {
            return Err(Error::Validation(
                "Report end date must not precede start date".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn into_snapshot(self, id: i64) -> MetricsSnapshot {
        MetricsSnapshot {
            id,
            upc: self.upc,
            report_start_date: self.report_start_date,
            report_end_date: self.report_end_date,
            metrics: self.metrics,
        }
    }
}

/// One projected period for a UPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub id: i64,
    pub upc: String,
    pub forecast_date: NaiveDate,
    pub predicted_sales_value: f64,
    pub predicted_sales_units: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewForecastResult {
    pub upc: String,
    pub forecast_date: NaiveDate,
    pub predicted_sales_value: f64,
    pub predicted_sales_units: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

impl NewForecastResult {
    pub(crate) fn into_result(self, id: i64, created_at: DateTime<Utc>) -> ForecastResult {
        ForecastResult {
            id,
            upc: self.upc,
            forecast_date: self.forecast_date,
            predicted_sales_value: self.predicted_sales_value,
            predicted_sales_units: self.predicted_sales_units,
            confidence_lower: self.confidence_lower,
            confidence_upper: self.confidence_upper,
            created_at,
        }
    }
}

/// A persisted what-if scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub id: i64,
    pub scenario_name: String,
    pub price_change: f64,
    pub distribution_change: f64,
    pub marketing_spend_change: f64,
    pub projected_sales_value: f64,
    pub projected_sales_units: f64,
    pub incremental_revenue: f64,
    pub investment_cost: f64,
    pub roi: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSimulationResult {
    pub scenario_name: String,
    pub price_change: f64,
    pub distribution_change: f64,
    pub marketing_spend_change: f64,
    pub projected_sales_value: f64,
    pub projected_sales_units: f64,
    pub incremental_revenue: f64,
    pub investment_cost: f64,
    pub roi: f64,
}

impl NewSimulationResult {
    pub(crate) fn into_result(self, id: i64, created_at: DateTime<Utc>) -> SimulationResult {
        SimulationResult {
            id,
            scenario_name: self.scenario_name,
            price_change: self.price_change,
            distribution_change: self.distribution_change,
            marketing_spend_change: self.marketing_spend_change,
            projected_sales_value: self.projected_sales_value,
            projected_sales_units: self.projected_sales_units,
            incremental_revenue: self.incremental_revenue,
            investment_cost: self.investment_cost,
            roi: self.roi,
            created_at,
        }
    }
}

/// A behavioral customer segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSegment {
    pub id: i64,
    pub segment_name: String,
    pub customer_count: i64,
    pub avg_spend: f64,
    pub purchase_frequency: f64,
    pub churn_risk_pct: f64,
    /// Customer lifetime value
    pub cltv: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomerSegment {
    pub segment_name: String,
    pub customer_count: i64,
    pub avg_spend: f64,
    pub purchase_frequency: f64,
    pub churn_risk_pct: f64,
    pub cltv: f64,
}

impl NewCustomerSegment {
    pub(crate) fn into_segment(self, id: i64) -> CustomerSegment {
        CustomerSegment {
            id,
            segment_name: self.segment_name,
            customer_count: self.customer_count,
            avg_spend: self.avg_spend,
            purchase_frequency: self.purchase_frequency,
            churn_risk_pct: self.churn_risk_pct,
            cltv: self.cltv,
        }
    }
}

/// Partial update for a customer segment (absent fields are left unchanged)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_spend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_frequency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub churn_risk_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cltv: Option<f64>,
}

impl SegmentUpdate {
    /// Apply the present fields onto an existing segment
    pub fn apply_to(&self, segment: &mut CustomerSegment) {
        if let Some(ref name) = self.segment_name {
            segment.segment_name = name.clone();
        }
        if let Some(count) = self.customer_count {
            segment.customer_count = count;
        }
        if let Some(spend) = self.avg_spend {
            segment.avg_spend = spend;
        }
        if let Some(freq) = self.purchase_frequency {
            segment.purchase_frequency = freq;
        }
        if let Some(churn) = self.churn_risk_pct {
            segment.churn_risk_pct = churn;
        }
        if let Some(cltv) = self.cltv {
            segment.cltv = cltv;
        }
    }
}

/// Category of a generated insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Growth,
    Risk,
    Opportunity,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Risk => "risk",
            Self::Opportunity => "opportunity",
        }
    }
}

impl std::str::FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "growth" => Ok(Self::Growth),
            "risk" => Ok(Self::Risk),
            "opportunity" => Ok(Self::Opportunity),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: i64,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub impact: Option<String>,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// An insight produced by a rule or text backend, before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    #[serde(default)]
    pub impact: Option<String>,
    pub confidence: f64,
}

impl NewInsight {
    pub fn new(
        insight_type: InsightType,
        title: impl Into<String>,
        description: impl Into<String>,
        recommendation: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            insight_type,
            title: title.into(),
            description: description.into(),
            recommendation: recommendation.into(),
            impact: None,
            confidence,
        }
    }

    pub fn with_impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = Some(impact.into());
        self
    }

    pub(crate) fn into_insight(self, id: i64, created_at: DateTime<Utc>) -> Insight {
        Insight {
            id,
            insight_type: self.insight_type,
            title: self.title,
            description: self.description,
            recommendation: self.recommendation,
            impact: self.impact,
            confidence: self.confidence,
            created_at,
        }
    }
}

/// Inclusive reporting window attached to a forecast request
///
/// Bounds accept `YYYY-MM-DD` or an RFC 3339 timestamp, whose date part is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(deserialize_with = "date_or_timestamp")]
    pub start: NaiveDate,
    #[serde(deserialize_with = "date_or_timestamp")]
    pub end: NaiveDate,
}

fn date_or_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

fn default_periods() -> u32 {
    DEFAULT_FORECAST_PERIODS
}

/// Request to project a UPC's sales forward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub upc: String,
    pub date_range: DateRange,
    #[serde(default = "default_periods")]
    pub periods: u32,
}

impl ForecastRequest {
    pub fn validate(&self) -> Result<()> {
        if self.upc.trim().is_empty() {
            return Err(Error::Validation("UPC must not be empty".into()));
        }
        if self.date_range.end < self.date_range.start {
            return Err(Error::Validation(
                "Date range end must not precede start".into(),
            ));
        }
        if self.periods > MAX_FORECAST_PERIODS {
            return Err(Error::Validation(format!(
                "Periods must be at most {}",
                MAX_FORECAST_PERIODS
            )));
        }
        Ok(())
    }
}

/// What-if levers, all expressed in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub price_change: f64,
    pub distribution_change: f64,
    pub marketing_spend_change: f64,
}

impl SimulationRequest {
    pub const PRICE_RANGE: (f64, f64) = (-20.0, 20.0);
    pub const DISTRIBUTION_RANGE: (f64, f64) = (-15.0, 15.0);
    pub const MARKETING_RANGE: (f64, f64) = (0.0, 50.0);

    pub fn new(price_change: f64, distribution_change: f64, marketing_spend_change: f64) -> Self {
        Self {
            price_change,
            distribution_change,
            marketing_spend_change,
        }
    }

    /// Check each lever against its allowed range (bounds inclusive)
    pub fn validate(&self) -> Result<()> {
        check_range("priceChange", self.price_change, Self::PRICE_RANGE)?;
        check_range(
            "distributionChange",
            self.distribution_change,
            Self::DISTRIBUTION_RANGE,
        )?;
        check_range(
            "marketingSpendChange",
            self.marketing_spend_change,
            Self::MARKETING_RANGE,
        )
    }
}

fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::Validation(format!(
            "{} must be between {} and {} (got {})",
            name, min, max, value
        )));
    }
    Ok(())
}
