//! Snapshot and customer segment commands

use anyhow::{Context, Result};
use shelfscope_core::format::{plain, thousands};
use shelfscope_core::{Repository, SegmentUpdate};

use super::truncate;

pub async fn cmd_snapshots_list(repo: &dyn Repository) -> Result<()> {
    let snapshots = repo.list_snapshots().await?;

    if snapshots.is_empty() {
        println!("No metrics snapshots stored yet. Run:");
        println!("  shelfscope seed");
        return Ok(());
    }

    println!();
    println!("📦 Metrics Snapshots");
    println!("   ─────────────────────────────────────────────────────────────");

    for s in snapshots {
        println!(
            "   {:12} │ {} → {} │ ${:>12} │ {:>8} units",
            truncate(&s.upc, 12),
            s.report_start_date,
            s.report_end_date,
            thousands(s.metrics.sales_value),
            thousands(s.metrics.sales_units)
        );
    }

    Ok(())
}

pub async fn cmd_snapshot_show(repo: &dyn Repository, upc: &str) -> Result<()> {
    let snapshot = repo
        .get_snapshot_by_upc(upc)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No data found for UPC {}", upc))?;
    let m = &snapshot.metrics;

    println!();
    println!(
        "📦 UPC {} ({} → {})",
        snapshot.upc, snapshot.report_start_date, snapshot.report_end_date
    );
    println!("   ─────────────────────────────");
    println!("   Sales value:          ${}", thousands(m.sales_value));
    println!("   Sales units:          {}", thousands(m.sales_units));
    println!("   Avg price per unit:   ${}", plain(m.average_price_per_unit));
    println!("   Stores selling:       {}", m.stores_selling);
    println!(
        "   ACV distribution:     {}%",
        plain(m.acv_weighted_ros_distribution_pct)
    );
    println!("   Customer penetration: {}%", plain(m.customer_penetration_pct));
    println!("   Loyal penetration:    {}%", plain(m.loyal_penetration_pct));
    println!("   Basket penetration:   {}%", plain(m.basket_penetration_pct));
    println!("   Repeat rate:          {}%", plain(m.repeat_rate_pct));

    Ok(())
}

pub async fn cmd_segments_list(repo: &dyn Repository) -> Result<()> {
    let segments = repo.list_segments().await?;

    if segments.is_empty() {
        println!("No customer segments stored yet. Run:");
        println!("  shelfscope seed");
        return Ok(());
    }

    println!();
    println!("👥 Customer Segments");
    println!("   ─────────────────────────────────────────────────────────────");

    for s in segments {
        println!(
            "   [{:>3}] {:12} │ {:>6} customers │ ${:>7.2} avg │ {:>5.1}% churn │ ${:>8.2} CLTV",
            s.id,
            truncate(&s.segment_name, 12),
            thousands(s.customer_count as f64),
            s.avg_spend,
            s.churn_risk_pct,
            s.cltv
        );
    }

    Ok(())
}

pub async fn cmd_segments_update(
    repo: &dyn Repository,
    id: i64,
    update: SegmentUpdate,
) -> Result<()> {
    if update == SegmentUpdate::default() {
        anyhow::bail!("Nothing to update (pass at least one field flag)");
    }
    if update.customer_count.is_some_and(|c| c < 0) {
        anyhow::bail!("--customer-count must not be negative");
    }

    let segment = repo
        .update_segment(id, update)
        .await
        .with_context(|| format!("Failed to update segment {}", id))?;

    println!(
        "✅ Segment updated: {} ({} customers, {}% churn risk)",
        segment.segment_name,
        thousands(segment.customer_count as f64),
        plain(segment.churn_risk_pct)
    );

    Ok(())
}
