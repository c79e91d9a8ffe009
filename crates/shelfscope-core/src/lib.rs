//! Shelfscope Core Library
//!
//! Shared functionality for the Shelfscope retail analytics backend:
//! - Domain models and the error type
//! - Pluggable repository (in-memory and SQLite)
//! - Trend/seasonality forecasting
//! - What-if simulation over price, distribution, and marketing levers
//! - Rule-based insight generation
//! - Pluggable text backends (templates, OpenAI-compatible servers)
//! - Analytics coefficient configuration

pub mod ai;
pub mod chat;
pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod insights;
pub mod models;
pub mod simulation;
pub mod storage;

/// Test utilities including a mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, BusinessContext, MockBackend, OpenAICompatibleBackend,
    StrategicRecommendation,
};
pub use config::{AnalyticsConfig, ForecastConfig, SimulationConfig};
pub use error::{Error, Result};
pub use forecast::{generate_forecast, ForecastModel, ProjectedPoint};
pub use insights::{InsightEngine, InsightRule};
pub use models::*;
pub use simulation::{run_simulation, Baseline, SimulationEngine, SimulationOutcome};
pub use storage::{seed_sample_data, MemoryRepository, Repository, SqliteRepository};
