//! Tests for loading configuration from disk.

use std::io::Write;

use crate::config::{MetricsConfig, ObservationPolicy};

#[test]
fn test_from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
        [engine]
        observation_policy = "require_explicit"
        centered_rmse = true

        [logging]
        level = "debug"
        "#
    )
    .expect("write config");

    let config = MetricsConfig::from_file(file.path()).expect("config must load");
    assert_eq!(config.engine.observation_policy, ObservationPolicy::RequireExplicit);
    assert!(config.engine.centered_rmse);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_from_file_missing_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");

    let err = MetricsConfig::from_file(&missing).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[logging]\nlevel = \"loud\"").expect("write config");

    let err = MetricsConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn test_from_file_rejects_unknown_policy() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[engine]\nobservation_policy = \"random\"").expect("write config");

    let err = MetricsConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
}
