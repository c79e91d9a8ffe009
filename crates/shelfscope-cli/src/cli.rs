//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Shelfscope - Retail analytics for a single product line
#[derive(Parser)]
#[command(name = "shelfscope")]
#[command(about = "Retail metrics, forecasts, what-if simulations and insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database path
    ///
    /// Without it, an in-memory store seeded with the sample dataset is used
    /// and nothing outlives the process.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Analytics coefficients file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Load the sample snapshot and customer segments (idempotent)
    Seed,

    /// Show metrics snapshots
    Snapshots {
        /// Show the full snapshot for one UPC
        upc: Option<String>,
    },

    /// List or update customer segments
    Segments {
        #[command(subcommand)]
        action: Option<SegmentsAction>,
    },

    /// Project sales forward for a UPC
    Forecast {
        /// Product UPC
        #[arg(long, default_value = "12345")]
        upc: String,

        /// Number of monthly periods to project
        #[arg(long, default_value = "4")]
        periods: u32,

        /// Report window start (YYYY-MM-DD, defaults to the snapshot's)
        #[arg(long)]
        start: Option<String>,

        /// Report window end (YYYY-MM-DD, defaults to the snapshot's)
        #[arg(long)]
        end: Option<String>,

        /// Month the seasonality table is anchored at (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Run a what-if scenario against the baseline snapshot
    Simulate {
        /// Price change in percent (-20 to 20)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        price: f64,

        /// Distribution change in percent (-15 to 15)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        distribution: f64,

        /// Marketing spend change in percent (0 to 50)
        #[arg(long, default_value = "0")]
        marketing: f64,
    },

    /// Generate or list insights
    Insights {
        #[command(subcommand)]
        action: Option<InsightsAction>,
    },

    /// Ask a question about the current data
    Ask {
        /// The question (quotes optional)
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum SegmentsAction {
    /// List segments (default)
    List,

    /// Update fields of one segment
    Update {
        /// Segment ID
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        customer_count: Option<i64>,

        #[arg(long)]
        avg_spend: Option<f64>,

        #[arg(long)]
        purchase_frequency: Option<f64>,

        /// Churn risk in percent
        #[arg(long)]
        churn_risk: Option<f64>,

        /// Customer lifetime value
        #[arg(long)]
        cltv: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum InsightsAction {
    /// Run the insight rules and print what was found (default)
    Generate,

    /// List stored insights
    List {
        /// Filter by type: growth, risk, opportunity
        #[arg(short = 't', long = "type")]
        insight_type: Option<String>,
    },

    /// Narrative performance summary
    Summary,
}
