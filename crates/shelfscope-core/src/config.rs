//! Analytics coefficient configuration
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `--config`), when given
//! 2. The override in the data dir (~/.local/share/shelfscope/config/analytics.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys omitted from an override file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Coefficients for the trend/seasonality forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub trend: f64,
    pub noise: f64,
    pub z_score: f64,
    pub seasonality: Vec<f64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            trend: 0.02,
            noise: 0.05,
            z_score: 1.96,
            seasonality: vec![
                1.0, 0.95, 1.05, 1.1, 1.08, 1.12, 1.15, 1.13, 1.06, 1.02, 0.98, 1.03,
            ],
        }
    }
}

/// Coefficients for the linear what-if model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub price_elasticity: f64,
    pub distribution_impact: f64,
    pub distribution_cost_rate: f64,
    pub marketing_efficiency: f64,
    pub marketing_cost_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            price_elasticity: -0.8,
            distribution_impact: 0.6,
            distribution_cost_rate: 0.02,
            marketing_efficiency: 0.3,
            marketing_cost_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub forecast: ForecastConfig,
    pub simulation: SimulationConfig,
}

impl AnalyticsConfig {
    /// Load from the override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AnalyticsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let forecast = &self.forecast;
        if forecast.seasonality.len() != 12 {
            return Err(Error::Config(format!(
                "forecast.seasonality needs 12 monthly factors, got {}",
                forecast.seasonality.len()
            )));
        }
        if forecast
            .seasonality
            .iter()
            .any(|f| !f.is_finite() || *f <= 0.0)
        {
            return Err(Error::Config(
                "forecast.seasonality factors must be positive".into(),
            ));
        }
        if !forecast.trend.is_finite() || forecast.trend <= -1.0 {
            return Err(Error::Config("forecast.trend must be greater than -1".into()));
        }
        if !forecast.noise.is_finite() || forecast.noise < 0.0 {
            return Err(Error::Config("forecast.noise must be non-negative".into()));
        }
        if !forecast.z_score.is_finite() || forecast.z_score < 0.0 {
            return Err(Error::Config("forecast.z_score must be non-negative".into()));
        }

        let sim = &self.simulation;
        let coefficients = [
            ("simulation.price_elasticity", sim.price_elasticity),
            ("simulation.distribution_impact", sim.distribution_impact),
            ("simulation.distribution_cost_rate", sim.distribution_cost_rate),
            ("simulation.marketing_efficiency", sim.marketing_efficiency),
            ("simulation.marketing_cost_rate", sim.marketing_cost_rate),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() {
                return Err(Error::Config(format!("{} must be finite", name)));
            }
        }
        if sim.distribution_cost_rate < 0.0 || sim.marketing_cost_rate < 0.0 {
            return Err(Error::Config("simulation cost rates must be non-negative".into()));
        }

        Ok(())
    }
}

/// Get the default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| {
        d.join("shelfscope")
            .join("config")
            .join("analytics.toml")
    })
}

fn load_config(override_path: Option<&Path>) -> Result<AnalyticsConfig> {
    let path = match override_path {
        Some(p) if !p.exists() => {
            return Err(Error::Config(format!(
                "config file not found: {}",
                p.display()
            )));
        }
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let content = match path {
        Some(ref p) => {
            tracing::debug!(path = %p.display(), "Loading analytics config");
            fs::read_to_string(p)?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    AnalyticsConfig::from_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = AnalyticsConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = AnalyticsConfig::from_toml("[forecast]\ntrend = 0.03\n").unwrap();
        assert_eq!(config.forecast.trend, 0.03);
        assert_eq!(config.forecast.noise, 0.05);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_rejects_short_seasonality() {
        let err = AnalyticsConfig::from_toml("[forecast]\nseasonality = [1.0, 1.0]\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = AnalyticsConfig::from_toml("[forecast\ntrend = ").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nprice_elasticity = -1.2").unwrap();

        let config = AnalyticsConfig::load_from(file.path()).unwrap();
        assert_eq!(config.simulation.price_elasticity, -1.2);
        assert_eq!(config.simulation.marketing_efficiency, 0.3);
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = AnalyticsConfig::load_from(&missing).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("config file not found"));
    }
}
