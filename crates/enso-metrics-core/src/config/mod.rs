//! Configuration management for the metrics engine.
//!
//! Configuration is layered the same way everywhere it is loaded:
//! 1. `config/default.toml`
//! 2. `config/{ENSO_METRICS_ENV}.toml`
//! 3. Environment variables with the `ENSO_METRICS__` prefix
//!    (e.g. `ENSO_METRICS__ENGINE__CENTERED_RMSE=true`)

mod sub_configs;

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, MetricsError, MetricsResult};

pub use sub_configs::{
    BatchConfig, EngineConfig, LoggingConfig, NonlinearityRatio, ObservationPolicy,
};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    pub batch: BatchConfig,
}

impl MetricsConfig {
    /// Load configuration from files and environment.
    pub fn load() -> MetricsResult<Self> {
        let env = std::env::var("ENSO_METRICS_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("ENSO_METRICS").separator("__"));

        let config: MetricsConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> MetricsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MetricsError::configuration(
                EntityKind::Setting,
                path.display().to_string(),
                format!("failed to read config file: {}", e),
            )
        })?;

        let config: MetricsConfig = toml::from_str(&content).map_err(|e| {
            MetricsError::configuration(
                EntityKind::Setting,
                path.display().to_string(),
                format!("failed to parse config file: {}", e),
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every sub-configuration.
    pub fn validate(&self) -> MetricsResult<()> {
        self.engine
            .validate()
            .and_then(|_| self.logging.validate())
            .and_then(|_| self.batch.validate())
            .map_err(|reason| MetricsError::configuration(EntityKind::Setting, "config", reason))
    }
}
