//! Storage layer
//!
//! All entities live behind the [`Repository`] trait. Two stores implement it:
//! - `memory` - mutex-guarded arenas with a single id counter
//! - `sqlite` - pooled SQLite database with migrations on open
//!
//! Every value handed out is an owned copy; mutating it never touches stored state.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    CustomerSegment, ForecastResult, Insight, InsightType, MetricsSnapshot, NewCustomerSegment,
    NewForecastResult, NewInsight, NewMetricsSnapshot, NewSimulationResult, SegmentUpdate,
    SimulationResult,
};

mod memory;
mod sample;
mod sqlite;

pub use memory::MemoryRepository;
pub use sample::{sample_metrics, sample_segments, sample_snapshot, seed_sample_data, SAMPLE_UPC};
pub use sqlite::SqliteRepository;

/// Pluggable store for every Shelfscope entity
#[async_trait]
pub trait Repository: Send + Sync {
    /// Short name of the backing store (for health output)
    fn kind(&self) -> &'static str;

    // --- Metrics snapshots ---

    /// All snapshots, in insertion order
    async fn list_snapshots(&self) -> Result<Vec<MetricsSnapshot>>;

    async fn get_snapshot_by_upc(&self, upc: &str) -> Result<Option<MetricsSnapshot>>;

    /// Insert or replace the snapshot for a UPC (an existing id is kept)
    async fn upsert_snapshot(&self, snapshot: NewMetricsSnapshot) -> Result<MetricsSnapshot>;

    // --- Forecasts ---

    async fn create_forecast(&self, forecast: NewForecastResult) -> Result<ForecastResult>;

    /// Forecast points, oldest first, optionally limited to one UPC
    async fn list_forecasts(&self, upc: Option<&str>) -> Result<Vec<ForecastResult>>;

    // --- Simulations ---

    async fn create_simulation(&self, simulation: NewSimulationResult)
        -> Result<SimulationResult>;

    async fn list_simulations(&self) -> Result<Vec<SimulationResult>>;

    // --- Customer segments ---

    async fn list_segments(&self) -> Result<Vec<CustomerSegment>>;

    async fn create_segment(&self, segment: NewCustomerSegment) -> Result<CustomerSegment>;

    /// Apply a partial update; fails with `NotFound` for an unknown id
    async fn update_segment(&self, id: i64, update: SegmentUpdate) -> Result<CustomerSegment>;

    // --- Insights ---

    async fn create_insight(&self, insight: NewInsight) -> Result<Insight>;

    /// Insights, oldest first, optionally limited to one type
    async fn list_insights(&self, insight_type: Option<InsightType>) -> Result<Vec<Insight>>;
}
