//! Tests for configuration validation.

use crate::config::MetricsConfig;

#[test]
fn test_validation_passes() {
    assert!(MetricsConfig::default().validate().is_ok());
}

#[test]
fn test_validation_fails_small_min_time_steps() {
    let mut config = MetricsConfig::default();
    config.engine.min_time_steps = 2;

    let result = config.validate();
    assert!(result.is_err(), "two samples cannot support a regression");
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("engine.min_time_steps"));
}

#[test]
fn test_validation_fails_unknown_format() {
    let mut config = MetricsConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_fails_excessive_workers() {
    let mut config = MetricsConfig::default();
    config.batch.worker_threads = 100_000;
    let msg = config.validate().unwrap_err().to_string();
    assert!(msg.contains("batch.worker_threads"));
}
