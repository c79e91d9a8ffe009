//! Shelfscope CLI - Retail analytics backend
//!
//! Usage:
//!   shelfscope seed --db shelf.db          Load the sample dataset
//!   shelfscope forecast --periods 6        Project sales forward
//!   shelfscope simulate --price 5          Run a what-if scenario
//!   shelfscope insights                    Generate insights
//!   shelfscope serve --port 3000           Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use shelfscope_core::AIClient;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let repo = commands::open_repo(cli.db.as_deref()).await?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(repo, config, &host, port, static_dir.as_deref()).await,
        Commands::Seed => commands::cmd_seed(repo.as_ref()).await,
        Commands::Snapshots { upc } => match upc {
            Some(upc) => commands::cmd_snapshot_show(repo.as_ref(), &upc).await,
            None => commands::cmd_snapshots_list(repo.as_ref()).await,
        },
        Commands::Segments { action } => match action {
            None | Some(SegmentsAction::List) => commands::cmd_segments_list(repo.as_ref()).await,
            Some(SegmentsAction::Update {
                id,
                name,
                customer_count,
                avg_spend,
                purchase_frequency,
                churn_risk,
                cltv,
            }) => {
                let update = shelfscope_core::SegmentUpdate {
                    segment_name: name,
                    customer_count,
                    avg_spend,
                    purchase_frequency,
                    churn_risk_pct: churn_risk,
                    cltv,
                };
                commands::cmd_segments_update(repo.as_ref(), id, update).await
            }
        },
        Commands::Forecast {
            upc,
            periods,
            start,
            end,
            as_of,
        } => {
            let args = commands::ForecastArgs {
                upc,
                periods,
                start,
                end,
                as_of,
            };
            commands::cmd_forecast(repo.as_ref(), &config, &args).await
        }
        Commands::Simulate {
            price,
            distribution,
            marketing,
        } => {
            let request = shelfscope_core::SimulationRequest::new(price, distribution, marketing);
            commands::cmd_simulate(repo.as_ref(), &config, &request).await
        }
        Commands::Insights { action } => {
            let ai = AIClient::from_env();
            match action {
                None | Some(InsightsAction::Generate) => {
                    commands::cmd_insights_generate(repo.as_ref(), ai.as_ref()).await
                }
                Some(InsightsAction::List { insight_type }) => {
                    commands::cmd_insights_list(repo.as_ref(), insight_type.as_deref()).await
                }
                Some(InsightsAction::Summary) => {
                    commands::cmd_summary(repo.as_ref(), ai.as_ref()).await
                }
            }
        }
        Commands::Ask { question } => {
            let ai = AIClient::from_env();
            commands::cmd_ask(repo.as_ref(), ai.as_ref(), &question.join(" ")).await
        }
    }
}
