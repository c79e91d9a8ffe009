//! Forecast and simulation commands

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use shelfscope_core::format::thousands;
use shelfscope_core::{
    generate_forecast, run_simulation, AnalyticsConfig, DateRange, ForecastModel,
    ForecastRequest, Repository, SimulationEngine, SimulationRequest,
};

/// Arguments of the `forecast` command
#[derive(Debug, Clone)]
pub struct ForecastArgs {
    pub upc: String,
    pub periods: u32,
    pub start: Option<String>,
    pub end: Option<String>,
    pub as_of: Option<String>,
}

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid --{} format (use YYYY-MM-DD)", flag))
}

pub async fn cmd_forecast(
    repo: &dyn Repository,
    config: &AnalyticsConfig,
    args: &ForecastArgs,
) -> Result<()> {
    let snapshot = repo
        .get_snapshot_by_upc(&args.upc)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No data found for UPC {}", args.upc))?;

    let start = parse_date(args.start.as_deref(), "start")?.unwrap_or(snapshot.report_start_date);
    let end = parse_date(args.end.as_deref(), "end")?.unwrap_or(snapshot.report_end_date);
    let as_of = parse_date(args.as_of.as_deref(), "as-of")?.unwrap_or_else(|| Utc::now().date_naive());

    let request = ForecastRequest {
        upc: args.upc.clone(),
        date_range: DateRange { start, end },
        periods: args.periods,
    };
    let model = ForecastModel::new(config.forecast.clone());
    let points = generate_forecast(repo, &model, &request, as_of)
        .await
        .context("Forecast failed")?;

    println!();
    println!("📈 Forecast for UPC {} ({} periods)", args.upc, points.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for p in &points {
        println!(
            "   {} │ ${:>10} ({:>10} – {:>10}) │ {:>7} units",
            p.forecast_date,
            thousands(p.predicted_sales_value),
            thousands(p.confidence_lower),
            thousands(p.confidence_upper),
            thousands(p.predicted_sales_units)
        );
    }

    Ok(())
}

pub async fn cmd_simulate(
    repo: &dyn Repository,
    config: &AnalyticsConfig,
    request: &SimulationRequest,
) -> Result<()> {
    let engine = SimulationEngine::new(config.simulation.clone());
    let result = run_simulation(repo, &engine, request)
        .await
        .context("Simulation failed")?;

    println!();
    println!("🧪 {}", result.scenario_name);
    println!("   ─────────────────────────────");
    println!(
        "   Levers: price {:+}%, distribution {:+}%, marketing {:+}%",
        result.price_change, result.distribution_change, result.marketing_spend_change
    );
    println!(
        "   Projected sales value: ${}",
        thousands(result.projected_sales_value)
    );
    println!(
        "   Projected sales units: {}",
        thousands(result.projected_sales_units)
    );
    println!(
        "   Incremental revenue:   ${}",
        thousands(result.incremental_revenue)
    );
    println!(
        "   Investment cost:       ${}",
        thousands(result.investment_cost)
    );
    println!("   ROI:                   {:.2}", result.roi);

    Ok(())
}
