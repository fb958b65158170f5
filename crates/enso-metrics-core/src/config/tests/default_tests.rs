//! Tests for default configuration values.

use crate::config::{
    BatchConfig, EngineConfig, LoggingConfig, MetricsConfig, NonlinearityRatio, ObservationPolicy,
};

#[test]
fn test_default_config() {
    let config = MetricsConfig::default();
    assert_eq!(config.engine, EngineConfig::default());
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.batch, BatchConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_engine_defaults() {
    let engine = EngineConfig::default();
    assert_eq!(engine.observation_policy, ObservationPolicy::FirstListed);
    assert_eq!(engine.nonlinearity_ratio, NonlinearityRatio::Channel);
    assert!(!engine.centered_rmse, "RMSE is uncentered unless asked");
    assert!(engine.area_weighted);
    assert_eq!(engine.min_time_steps, 12);
}

#[test]
fn test_logging_defaults() {
    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert_eq!(logging.format, "pretty");
    assert!(!logging.include_location);
}

#[test]
fn test_partial_toml_fills_defaults() {
    let config: MetricsConfig = toml::from_str(
        r#"
        [engine]
        nonlinearity_ratio = "primary_value"
        "#,
    )
    .expect("partial config must parse");

    assert_eq!(config.engine.nonlinearity_ratio, NonlinearityRatio::PrimaryValue);
    assert_eq!(config.engine.observation_policy, ObservationPolicy::FirstListed);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_serialization_round_trip() {
    let mut config = MetricsConfig::default();
    config.engine.observation_policy = ObservationPolicy::RequireExplicit;
    config.batch.worker_threads = 4;

    let text = toml::to_string(&config).expect("config must serialize to TOML");
    let back: MetricsConfig = toml::from_str(&text).expect("config must deserialize");
    assert_eq!(back, config);
}
