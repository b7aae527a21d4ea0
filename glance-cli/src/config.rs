//! Configuration for the demo command.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The forecast row the demo host serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Maximum temperature, as the store would hold it.
    pub max_temp: f64,
    /// Minimum temperature, as the store would hold it.
    pub min_temp: f64,
    /// Weather condition code.
    pub condition_id: i32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            max_temp: 75.7,
            min_temp: 52.9,
            condition_id: 800,
        }
    }
}

/// Demo run configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of taps to simulate.
    pub taps: u32,
    /// The forecast the host serves.
    pub forecast: ForecastConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            taps: 2,
            forecast: ForecastConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a TOML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents).context("invalid demo configuration")
    }
}
