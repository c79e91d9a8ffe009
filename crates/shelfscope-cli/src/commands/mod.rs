//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_repo, load_config) and seeding
//! - `data` - Snapshot and customer segment commands
//! - `analytics` - Forecast and simulation commands
//! - `insights` - Insight, summary and question commands
//! - `serve` - Web server command

pub mod analytics;
pub mod core;
pub mod data;
pub mod insights;
pub mod serve;

// Re-export command functions for main.rs
pub use analytics::*;
pub use core::*;
pub use data::*;
pub use insights::*;
pub use serve::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
