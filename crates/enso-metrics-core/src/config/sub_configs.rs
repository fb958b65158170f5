//! Sub-configuration structures for the metrics engine.
//!
//! Each struct carries its own `Default` and `validate()`; the top-level
//! [`MetricsConfig`](super::MetricsConfig) calls them in turn.

use serde::{Deserialize, Serialize};

/// How the engine picks an observation dataset when the caller names none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationPolicy {
    /// Use the first dataset in the metric's acceptable list.
    #[default]
    FirstListed,
    /// Refuse to guess; every variable needs an explicit dataset.
    RequireExplicit,
}

/// Which ratio is reported for the nonlinearity channel of regression metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonlinearityRatio {
    /// `nonlinearity_model / nonlinearity_obs`, error from the same channel.
    #[default]
    Channel,
    /// Historical behaviour: the primary `value_model / value_obs` ratio is
    /// reported as the nonlinearity metric while its error is propagated
    /// from the nonlinearity channel.
    PrimaryValue,
}

/// Metric computation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub observation_policy: ObservationPolicy,
    pub nonlinearity_ratio: NonlinearityRatio,
    /// Remove the spatial mean of each field before computing RMSE.
    pub centered_rmse: bool,
    /// Weight latitudes by cos(lat) in spatial reductions.
    pub area_weighted: bool,
    /// Lower bound on aligned samples, applied on top of each collection's
    /// own `min_time_steps`.
    pub min_time_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            observation_policy: ObservationPolicy::FirstListed,
            nonlinearity_ratio: NonlinearityRatio::Channel,
            centered_rmse: false,
            area_weighted: true,
            min_time_steps: 12,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_time_steps < 3 {
            return Err(format!(
                "engine.min_time_steps must be at least 3 (a regression needs three points), got {}",
                self.min_time_steps
            ));
        }
        Ok(())
    }
}

/// Logging configuration consumed by binaries when installing a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];
    const FORMATS: [&'static str; 2] = ["pretty", "compact"];

    pub fn validate(&self) -> Result<(), String> {
        if !Self::LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "logging.level must be one of {:?}, got '{}'",
                Self::LEVELS,
                self.level
            ));
        }
        if !Self::FORMATS.contains(&self.format.as_str()) {
            return Err(format!(
                "logging.format must be one of {:?}, got '{}'",
                Self::FORMATS,
                self.format
            ));
        }
        Ok(())
    }
}

/// Parallel batch computation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for batch computation. 0 uses the global rayon pool.
    pub worker_threads: usize,
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_threads > 1024 {
            return Err(format!(
                "batch.worker_threads must be at most 1024, got {}",
                self.worker_threads
            ));
        }
        Ok(())
    }
}
