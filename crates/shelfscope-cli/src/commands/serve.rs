//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use shelfscope_core::{AIClient, AnalyticsConfig, Repository};
use shelfscope_server::{AppState, ServerConfig};

pub async fn cmd_serve(
    repo: Arc<dyn Repository>,
    analytics: AnalyticsConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Shelfscope web server...");
    println!("   Storage: {}", repo.kind());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env();
    if !config.allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} (SHELFSCOPE_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }

    if repo.list_snapshots().await?.is_empty() {
        println!();
        println!("   💡 Tip: No metrics loaded yet. Run: shelfscope seed --db <path>");
    }

    println!();
    println!("   Press Ctrl+C to stop");

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;

    let state = AppState::new(repo, analytics, AIClient::from_env(), config);
    shelfscope_server::serve(state, host, port, static_dir_str).await?;

    Ok(())
}
