//! Sample dataset for demos and tests

use chrono::NaiveDate;
use tracing::info;

use super::Repository;
use crate::error::Result;
use crate::models::{NewCustomerSegment, NewMetricsSnapshot, RetailMetrics};

/// UPC of the bundled sample product
pub const SAMPLE_UPC: &str = "12345";

/// Q1 2025 measures for the sample product
pub fn sample_metrics() -> RetailMetrics {
    RetailMetrics {
        acv_weighted_ros_distribution_pct: 78.5,
        acv_weighted_ros_sales: 152000.0,
        acv_weighted_ros_units: 8450.0,
        associated_category_spend: 290000.0,
        associated_category_spend_per_transaction: 18.2,
        associated_retailer_spend: 132000.0,
        associated_retailer_spend_per_transaction: 14.1,
        average_price_per_unit: 4.9,
        basket_penetration_pct: 26.8,
        category_share_spend_pct: 19.4,
        category_share_units_pct: 17.9,
        customer_penetration_pct: 13.6,
        customers: 8800,
        discontinued_products_sales_value: 6500.0,
        frequency_of_purchase: 2.9,
        loyal_penetration_pct: 9.2,
        repeat_rate_pct: 68.3,
        new_products_sales_value: 8700.0,
        number_of_products: 24,
        retailer_customers: 6100,
        retailer_transactions: 7900,
        sales_per_store: 2650.0,
        sales_unit_continuous_products: 7900.0,
        sales_units: 8650.0,
        sales_value: 168000.0,
        stores_selling: 245,
        transactions: 10100,
        spend_per_customer: 19.1,
        spend_per_loyal_customer: 27.3,
        spend_per_transaction: 16.6,
        units_per_customer: 1.8,
        units_per_store: 35.3,
        units_per_transaction: 1.2,
    }
}

pub fn sample_snapshot() -> NewMetricsSnapshot {
    NewMetricsSnapshot {
        upc: SAMPLE_UPC.to_string(),
        report_start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        report_end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap_or_default(),
        metrics: sample_metrics(),
    }
}

/// The four behavioral segments, highest value first
pub fn sample_segments() -> Vec<NewCustomerSegment> {
    let segment = |name: &str, count: i64, spend: f64, freq: f64, churn: f64, cltv: f64| {
        NewCustomerSegment {
            segment_name: name.to_string(),
            customer_count: count,
            avg_spend: spend,
            purchase_frequency: freq,
            churn_risk_pct: churn,
            cltv,
        }
    };

    vec![
        segment("High-Value", 1320, 43.20, 4.2, 5.2, 183.0),
        segment("Loyal", 809, 27.30, 3.8, 8.1, 156.0),
        segment("Regular", 4410, 16.80, 2.1, 14.3, 98.0),
        segment("At-Risk", 2261, 8.90, 1.2, 28.7, 52.0),
    ]
}

/// Load the sample dataset unless it is already present
///
/// The snapshot is upserted (so its id is stable); segments are only
/// created when the store has none.
pub async fn seed_sample_data(repo: &dyn Repository) -> Result<()> {
    repo.upsert_snapshot(sample_snapshot()).await?;

    if repo.list_segments().await?.is_empty() {
        for segment in sample_segments() {
            repo.create_segment(segment).await?;
        }
    }

    info!(upc = SAMPLE_UPC, "Sample data seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRepository;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = MemoryRepository::new();
        seed_sample_data(&repo).await.unwrap();
        seed_sample_data(&repo).await.unwrap();

        assert_eq!(repo.list_snapshots().await.unwrap().len(), 1);
        let segments = repo.list_segments().await.unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3].segment_name, "At-Risk");
        assert_eq!(segments[3].churn_risk_pct, 28.7);
    }

    #[test]
    fn test_sample_snapshot_period() {
        let snapshot = sample_snapshot();
        assert!(snapshot.validate().is_ok());
        assert_eq!(snapshot.metrics.sales_units, 8650.0);
    }
}
