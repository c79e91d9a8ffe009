//! Shared utilities and seeding
//!
//! This module contains:
//! - `open_repo` - Open the SQLite store, or a seeded in-memory one
//! - `load_config` - Resolve the analytics coefficients
//! - `cmd_seed` - Load the sample dataset

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use shelfscope_core::{
    seed_sample_data, AnalyticsConfig, MemoryRepository, Repository, SqliteRepository,
};

/// Open the SQLite database at `db_path`, or a seeded in-memory store when none is given
pub async fn open_repo(db_path: Option<&Path>) -> Result<Arc<dyn Repository>> {
    match db_path {
        Some(path) => {
            let path_str = path
                .to_str()
                .context("Database path must be valid UTF-8")?;
            let repo = SqliteRepository::new(path_str).context("Failed to open database")?;
            Ok(Arc::new(repo))
        }
        None => {
            let repo = MemoryRepository::new();
            seed_sample_data(&repo)
                .await
                .context("Failed to seed sample data")?;
            Ok(Arc::new(repo))
        }
    }
}

/// Load analytics coefficients from `path`, or the default locations
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    match path {
        Some(p) => AnalyticsConfig::load_from(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => AnalyticsConfig::load().context("Failed to load analytics config"),
    }
}

pub async fn cmd_seed(repo: &dyn Repository) -> Result<()> {
    println!("🌱 Seeding sample data ({} store)...", repo.kind());

    seed_sample_data(repo)
        .await
        .context("Failed to seed sample data")?;

    let snapshots = repo.list_snapshots().await?.len();
    let segments = repo.list_segments().await?.len();
    println!("   Snapshots: {}", snapshots);
    println!("   Customer segments: {}", segments);
    println!("✅ Sample data ready");
    println!();
    println!("Next steps:");
    println!("  1. Generate insights: shelfscope insights");
    println!("  2. Start web UI: shelfscope serve");

    Ok(())
}
