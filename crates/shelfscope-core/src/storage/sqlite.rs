//! SQLite repository with connection pooling and migrations

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::Repository;
use crate::error::{Error, Result};
use crate::models::{
    CustomerSegment, ForecastResult, Insight, InsightType, MetricsSnapshot, NewCustomerSegment,
    NewForecastResult, NewInsight, NewMetricsSnapshot, NewSimulationResult, RetailMetrics,
    SegmentUpdate, SimulationResult,
};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

/// Stored timestamps are RFC 3339
fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Persistent store backed by a SQLite file
#[derive(Clone)]
pub struct SqliteRepository {
    pool: DbPool,
    db_path: String,
}

impl SqliteRepository {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let repo = Self {
            pool,
            db_path: path.to_string(),
        };
        repo.run_migrations()?;

        Ok(repo)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "shelfscope_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- One row per UPC; the 33 measures travel as a JSON object
            CREATE TABLE IF NOT EXISTS snapshots (
                id INTEGER PRIMARY KEY,
                upc TEXT NOT NULL UNIQUE,
                report_start_date TEXT NOT NULL,
                report_end_date TEXT NOT NULL,
                metrics TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS forecasts (
                id INTEGER PRIMARY KEY,
                upc TEXT NOT NULL,
                forecast_date TEXT NOT NULL,
                predicted_sales_value REAL NOT NULL,
                predicted_sales_units REAL NOT NULL,
                confidence_lower REAL NOT NULL,
                confidence_upper REAL NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_forecasts_upc ON forecasts(upc);

            CREATE TABLE IF NOT EXISTS simulations (
                id INTEGER PRIMARY KEY,
                scenario_name TEXT NOT NULL,
                price_change REAL NOT NULL,
                distribution_change REAL NOT NULL,
                marketing_spend_change REAL NOT NULL,
                projected_sales_value REAL NOT NULL,
                projected_sales_units REAL NOT NULL,
                incremental_revenue REAL NOT NULL,
                investment_cost REAL NOT NULL,
                roi REAL NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS customer_segments (
                id INTEGER PRIMARY KEY,
                segment_name TEXT NOT NULL,
                customer_count INTEGER NOT NULL,
                avg_spend REAL NOT NULL,
                purchase_frequency REAL NOT NULL,
                churn_risk_pct REAL NOT NULL,
                cltv REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS insights (
                id INTEGER PRIMARY KEY,
                insight_type TEXT NOT NULL CHECK (insight_type IN ('growth', 'risk', 'opportunity')),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                recommendation TEXT NOT NULL,
                impact TEXT,
                confidence REAL NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_insights_type ON insights(insight_type);
            "#,
        )?;

        info!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}

const SNAPSHOT_COLUMNS: &str = "id, upc, report_start_date, report_end_date, metrics";

fn row_to_snapshot(row: &Row<'_>) -> rusqlite::Result<MetricsSnapshot> {
    let metrics_json: String = row.get(4)?;
    let metrics: RetailMetrics =
        serde_json::from_str(&metrics_json).map_err(|e| conversion_error(4, e))?;
    Ok(MetricsSnapshot {
        id: row.get(0)?,
        upc: row.get(1)?,
        report_start_date: date_column(row, 2)?,
        report_end_date: date_column(row, 3)?,
        metrics,
    })
}

const FORECAST_COLUMNS: &str = "id, upc, forecast_date, predicted_sales_value, \
     predicted_sales_units, confidence_lower, confidence_upper, created_at";

fn row_to_forecast(row: &Row<'_>) -> rusqlite::Result<ForecastResult> {
    Ok(ForecastResult {
        id: row.get(0)?,
        upc: row.get(1)?,
        forecast_date: date_column(row, 2)?,
        predicted_sales_value: row.get(3)?,
        predicted_sales_units: row.get(4)?,
        confidence_lower: row.get(5)?,
        confidence_upper: row.get(6)?,
        created_at: datetime_column(row, 7)?,
    })
}

const SIMULATION_COLUMNS: &str = "id, scenario_name, price_change, distribution_change, \
     marketing_spend_change, projected_sales_value, projected_sales_units, \
     incremental_revenue, investment_cost, roi, created_at";

fn row_to_simulation(row: &Row<'_>) -> rusqlite::Result<SimulationResult> {
    Ok(SimulationResult {
        id: row.get(0)?,
        scenario_name: row.get(1)?,
        price_change: row.get(2)?,
        distribution_change: row.get(3)?,
        marketing_spend_change: row.get(4)?,
        projected_sales_value: row.get(5)?,
        projected_sales_units: row.get(6)?,
        incremental_revenue: row.get(7)?,
        investment_cost: row.get(8)?,
        roi: row.get(9)?,
        created_at: datetime_column(row, 10)?,
    })
}

const SEGMENT_COLUMNS: &str =
    "id, segment_name, customer_count, avg_spend, purchase_frequency, churn_risk_pct, cltv";

fn row_to_segment(row: &Row<'_>) -> rusqlite::Result<CustomerSegment> {
    Ok(CustomerSegment {
        id: row.get(0)?,
        segment_name: row.get(1)?,
        customer_count: row.get(2)?,
        avg_spend: row.get(3)?,
        purchase_frequency: row.get(4)?,
        churn_risk_pct: row.get(5)?,
        cltv: row.get(6)?,
    })
}

const INSIGHT_COLUMNS: &str =
    "id, insight_type, title, description, recommendation, impact, confidence, created_at";

fn row_to_insight(row: &Row<'_>) -> rusqlite::Result<Insight> {
    let type_str: String = row.get(1)?;
    let insight_type: InsightType = type_str.parse().map_err(|e: String| {
        conversion_error(1, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    Ok(Insight {
        id: row.get(0)?,
        insight_type,
        title: row.get(2)?,
        description: row.get(3)?,
        recommendation: row.get(4)?,
        impact: row.get(5)?,
        confidence: row.get(6)?,
        created_at: datetime_column(row, 7)?,
    })
}

#[async_trait]
impl Repository for SqliteRepository {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn list_snapshots(&self) -> Result<Vec<MetricsSnapshot>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM snapshots ORDER BY id",
            SNAPSHOT_COLUMNS
        ))?;
        let snapshots = stmt
            .query_map([], row_to_snapshot)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(snapshots)
    }

    async fn get_snapshot_by_upc(&self, upc: &str) -> Result<Option<MetricsSnapshot>> {
        let conn = self.conn()?;
        let snapshot = conn
            .query_row(
                &format!("SELECT {} FROM snapshots WHERE upc = ?", SNAPSHOT_COLUMNS),
                params![upc],
                row_to_snapshot,
            )
            .optional()?;
        Ok(snapshot)
    }

    async fn upsert_snapshot(&self, snapshot: NewMetricsSnapshot) -> Result<MetricsSnapshot> {
        let conn = self.conn()?;
        let metrics_json = serde_json::to_string(&snapshot.metrics)?;

        conn.execute(
            r#"
            INSERT INTO snapshots (upc, report_start_date, report_end_date, metrics)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(upc) DO UPDATE SET
                report_start_date = excluded.report_start_date,
                report_end_date = excluded.report_end_date,
                metrics = excluded.metrics
            "#,
            params![
                snapshot.upc,
                snapshot.report_start_date.format(DATE_FORMAT).to_string(),
                snapshot.report_end_date.format(DATE_FORMAT).to_string(),
                metrics_json
            ],
        )?;

        let id: i64 = conn.query_row(
            "SELECT id FROM snapshots WHERE upc = ?",
            params![snapshot.upc],
            |row| row.get(0),
        )?;

        Ok(snapshot.into_snapshot(id))
    }

    async fn create_forecast(&self, forecast: NewForecastResult) -> Result<ForecastResult> {
        let conn = self.conn()?;
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO forecasts (
                upc, forecast_date, predicted_sales_value, predicted_sales_units,
                confidence_lower, confidence_upper, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                forecast.upc,
                forecast.forecast_date.format(DATE_FORMAT).to_string(),
                forecast.predicted_sales_value,
                forecast.predicted_sales_units,
                forecast.confidence_lower,
                forecast.confidence_upper,
                created_at.to_rfc3339()
            ],
        )?;

        Ok(forecast.into_result(conn.last_insert_rowid(), created_at))
    }

    async fn list_forecasts(&self, upc: Option<&str>) -> Result<Vec<ForecastResult>> {
        let conn = self.conn()?;

        let rows = if let Some(upc) = upc {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM forecasts WHERE upc = ? ORDER BY id",
                FORECAST_COLUMNS
            ))?;
            let rows = stmt.query_map(params![upc], row_to_forecast)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM forecasts ORDER BY id",
                FORECAST_COLUMNS
            ))?;
            let rows = stmt.query_map([], row_to_forecast)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(rows)
    }

    async fn create_simulation(
        &self,
        simulation: NewSimulationResult,
    ) -> Result<SimulationResult> {
        let conn = self.conn()?;
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO simulations (
                scenario_name, price_change, distribution_change, marketing_spend_change,
                projected_sales_value, projected_sales_units, incremental_revenue,
                investment_cost, roi, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                simulation.scenario_name,
                simulation.price_change,
                simulation.distribution_change,
                simulation.marketing_spend_change,
                simulation.projected_sales_value,
                simulation.projected_sales_units,
                simulation.incremental_revenue,
                simulation.investment_cost,
                simulation.roi,
                created_at.to_rfc3339()
            ],
        )?;

        Ok(simulation.into_result(conn.last_insert_rowid(), created_at))
    }

    async fn list_simulations(&self) -> Result<Vec<SimulationResult>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM simulations ORDER BY id",
            SIMULATION_COLUMNS
        ))?;
        let simulations = stmt
            .query_map([], row_to_simulation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(simulations)
    }

    async fn list_segments(&self) -> Result<Vec<CustomerSegment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM customer_segments ORDER BY id",
            SEGMENT_COLUMNS
        ))?;
        let segments = stmt
            .query_map([], row_to_segment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(segments)
    }

    async fn create_segment(&self, segment: NewCustomerSegment) -> Result<CustomerSegment> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO customer_segments (
                segment_name, customer_count, avg_spend, purchase_frequency, churn_risk_pct, cltv
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                segment.segment_name,
                segment.customer_count,
                segment.avg_spend,
                segment.purchase_frequency,
                segment.churn_risk_pct,
                segment.cltv
            ],
        )?;

        Ok(segment.into_segment(conn.last_insert_rowid()))
    }

    async fn update_segment(&self, id: i64, update: SegmentUpdate) -> Result<CustomerSegment> {
        let conn = self.conn()?;
        let mut segment = conn
            .query_row(
                &format!("SELECT {} FROM customer_segments WHERE id = ?", SEGMENT_COLUMNS),
                params![id],
                row_to_segment,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Customer segment {} not found", id)))?;

        update.apply_to(&mut segment);

        conn.execute(
            r#"
            UPDATE customer_segments
            SET segment_name = ?, customer_count = ?, avg_spend = ?,
                purchase_frequency = ?, churn_risk_pct = ?, cltv = ?
            WHERE id = ?
            "#,
            params![
                segment.segment_name,
                segment.customer_count,
                segment.avg_spend,
                segment.purchase_frequency,
                segment.churn_risk_pct,
                segment.cltv,
                id
            ],
        )?;

        Ok(segment)
    }

    async fn create_insight(&self, insight: NewInsight) -> Result<Insight> {
        let conn = self.conn()?;
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO insights (
                insight_type, title, description, recommendation, impact, confidence, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                insight.insight_type.as_str(),
                insight.title,
                insight.description,
                insight.recommendation,
                insight.impact,
                insight.confidence,
                created_at.to_rfc3339()
            ],
        )?;

        Ok(insight.into_insight(conn.last_insert_rowid(), created_at))
    }

    async fn list_insights(&self, insight_type: Option<InsightType>) -> Result<Vec<Insight>> {
        let conn = self.conn()?;

        let rows = if let Some(t) = insight_type {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM insights WHERE insight_type = ? ORDER BY id",
                INSIGHT_COLUMNS
            ))?;
            let rows = stmt.query_map(params![t.as_str()], row_to_insight)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM insights ORDER BY id",
                INSIGHT_COLUMNS
            ))?;
            let rows = stmt.query_map([], row_to_insight)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{sample_segments, sample_snapshot, SAMPLE_UPC};

    #[tokio::test]
    async fn test_snapshot_round_trips_all_metrics() {
        let repo = SqliteRepository::in_memory().unwrap();
        let stored = repo.upsert_snapshot(sample_snapshot()).await.unwrap();

        let loaded = repo.get_snapshot_by_upc(SAMPLE_UPC).await.unwrap().unwrap();
        assert_eq!(loaded, stored);
        assert!(repo.get_snapshot_by_upc("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_id() {
        let repo = SqliteRepository::in_memory().unwrap();
        let first = repo.upsert_snapshot(sample_snapshot()).await.unwrap();

        let mut replacement = sample_snapshot();
        replacement.metrics.customers = 1;
        let second = repo.upsert_snapshot(replacement).await.unwrap();

        assert_eq!(first.id, second.id);
        let all = repo.list_snapshots().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].metrics.customers, 1);
    }

    #[tokio::test]
    async fn test_segment_partial_update() {
        let repo = SqliteRepository::in_memory().unwrap();
        let created = repo
            .create_segment(sample_segments().remove(1))
            .await
            .unwrap();

        let updated = repo
            .update_segment(
                created.id,
                SegmentUpdate {
                    churn_risk_pct: Some(3.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.churn_risk_pct, 3.5);
        assert_eq!(updated.segment_name, created.segment_name);
        assert_eq!(repo.list_segments().await.unwrap()[0], updated);

        let err = repo
            .update_segment(created.id + 100, SegmentUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insight_impact_and_type_persist() {
        let repo = SqliteRepository::in_memory().unwrap();
        repo.create_insight(
            NewInsight::new(InsightType::Opportunity, "Bundle", "d", "r", 0.8).with_impact("+5%"),
        )
        .await
        .unwrap();
        repo.create_insight(NewInsight::new(InsightType::Risk, "Churn", "d", "r", 0.9))
            .await
            .unwrap();

        let opportunities = repo
            .list_insights(Some(InsightType::Opportunity))
            .await
            .unwrap();
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].impact.as_deref(), Some("+5%"));
        assert_eq!(repo.list_insights(None).await.unwrap().len(), 2);
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelfscope.db");
        let path = path.to_string_lossy();

        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let repo = SqliteRepository::new(&path).unwrap();
            repo.upsert_snapshot(sample_snapshot()).await.unwrap();
        });
        rt.block_on(async {
            let repo = SqliteRepository::new(&path).unwrap();
            assert_eq!(repo.list_snapshots().await.unwrap().len(), 1);
        });
    }
}
