//! In-memory repository
//!
//! One mutex guards every arena. Ids come from a single counter shared by all
//! entity kinds, so an id is never reused within the process.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::Repository;
use crate::error::{Error, Result};
use crate::models::{
    CustomerSegment, ForecastResult, Insight, InsightType, MetricsSnapshot, NewCustomerSegment,
    NewForecastResult, NewInsight, NewMetricsSnapshot, NewSimulationResult, SegmentUpdate,
    SimulationResult,
};

#[derive(Default)]
struct Arenas {
    next_id: i64,
    snapshots: BTreeMap<i64, MetricsSnapshot>,
    forecasts: BTreeMap<i64, ForecastResult>,
    simulations: BTreeMap<i64, SimulationResult>,
    segments: BTreeMap<i64, CustomerSegment>,
    insights: BTreeMap<i64, Insight>,
}

impl Arenas {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Volatile store used when no database path is configured
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Arenas>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn arenas(&self) -> MutexGuard<'_, Arenas> {
        // A panic while holding the lock cannot leave an arena half-written
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn list_snapshots(&self) -> Result<Vec<MetricsSnapshot>> {
        Ok(self.arenas().snapshots.values().cloned().collect())
    }

    async fn get_snapshot_by_upc(&self, upc: &str) -> Result<Option<MetricsSnapshot>> {
        Ok(self
            .arenas()
            .snapshots
            .values()
            .find(|s| s.upc == upc)
            .cloned())
    }

    async fn upsert_snapshot(&self, snapshot: NewMetricsSnapshot) -> Result<MetricsSnapshot> {
        let mut arenas = self.arenas();
        let existing = arenas
            .snapshots
            .values()
            .find(|s| s.upc == snapshot.upc)
            .map(|s| s.id);
        let id = match existing {
            Some(id) => id,
            None => arenas.allocate_id(),
        };

        let stored = snapshot.into_snapshot(id);
        arenas.snapshots.insert(id, stored.clone());
        Ok(stored)
    }

    async fn create_forecast(&self, forecast: NewForecastResult) -> Result<ForecastResult> {
        let mut arenas = self.arenas();
        let id = arenas.allocate_id();
        let stored = forecast.into_result(id, Utc::now());
        arenas.forecasts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_forecasts(&self, upc: Option<&str>) -> Result<Vec<ForecastResult>> {
        Ok(self
            .arenas()
            .forecasts
            .values()
            .filter(|f| upc.map_or(true, |u| f.upc == u))
            .cloned()
            .collect())
    }

    async fn create_simulation(
        &self,
        simulation: NewSimulationResult,
    ) -> Result<SimulationResult> {
        let mut arenas = self.arenas();
        let id = arenas.allocate_id();
        let stored = simulation.into_result(id, Utc::now());
        arenas.simulations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_simulations(&self) -> Result<Vec<SimulationResult>> {
        Ok(self.arenas().simulations.values().cloned().collect())
    }

    async fn list_segments(&self) -> Result<Vec<CustomerSegment>> {
        Ok(self.arenas().segments.values().cloned().collect())
    }

    async fn create_segment(&self, segment: NewCustomerSegment) -> Result<CustomerSegment> {
        let mut arenas = self.arenas();
        let id = arenas.allocate_id();
        let stored = segment.into_segment(id);
        arenas.segments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_segment(&self, id: i64, update: SegmentUpdate) -> Result<CustomerSegment> {
        let mut arenas = self.arenas();
        let segment = arenas
            .segments
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Customer segment {} not found", id)))?;
        update.apply_to(segment);
        Ok(segment.clone())
    }

    async fn create_insight(&self, insight: NewInsight) -> Result<Insight> {
        let mut arenas = self.arenas();
        let id = arenas.allocate_id();
        let stored = insight.into_insight(id, Utc::now());
        arenas.insights.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_insights(&self, insight_type: Option<InsightType>) -> Result<Vec<Insight>> {
        Ok(self
            .arenas()
            .insights
            .values()
            .filter(|i| insight_type.map_or(true, |t| i.insight_type == t))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{sample_segments, sample_snapshot};

    #[tokio::test]
    async fn test_ids_are_unique_across_entity_kinds() {
        let repo = MemoryRepository::new();
        let snapshot = repo.upsert_snapshot(sample_snapshot()).await.unwrap();
        let segment = repo
            .create_segment(sample_segments().remove(0))
            .await
            .unwrap();
        let insight = repo
            .create_insight(NewInsight::new(
                InsightType::Growth,
                "t",
                "d",
                "r",
                0.5,
            ))
            .await
            .unwrap();

        assert_eq!(snapshot.id, 1);
        assert_eq!(segment.id, 2);
        assert_eq!(insight.id, 3);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_keeps_id() {
        let repo = MemoryRepository::new();
        let first = repo.upsert_snapshot(sample_snapshot()).await.unwrap();

        let mut replacement = sample_snapshot();
        replacement.metrics.sales_value = 1.0;
        let second = repo.upsert_snapshot(replacement).await.unwrap();

        assert_eq!(first.id, second.id);
        let all = repo.list_snapshots().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].metrics.sales_value, 1.0);
    }

    #[tokio::test]
    async fn test_returned_values_are_copies() {
        let repo = MemoryRepository::new();
        let mut snapshot = repo.upsert_snapshot(sample_snapshot()).await.unwrap();
        snapshot.metrics.sales_value = 0.0;

        let stored = repo.get_snapshot_by_upc(&snapshot.upc).await.unwrap().unwrap();
        assert_eq!(stored.metrics.sales_value, 168000.0);
    }

    #[tokio::test]
    async fn test_update_missing_segment_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo
            .update_segment(99, SegmentUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_insights_filters_by_type() {
        let repo = MemoryRepository::new();
        for insight_type in [InsightType::Growth, InsightType::Risk, InsightType::Risk] {
            repo.create_insight(NewInsight::new(insight_type, "t", "d", "r", 0.9))
                .await
                .unwrap();
        }

        assert_eq!(repo.list_insights(None).await.unwrap().len(), 3);
        assert_eq!(
            repo.list_insights(Some(InsightType::Risk)).await.unwrap().len(),
            2
        );
        assert!(repo
            .list_insights(Some(InsightType::Opportunity))
            .await
            .unwrap()
            .is_empty());
    }
}
