//! Engine construction, planning and dispatch tests against the built-in
//! tables.

use std::sync::Arc;

use chrono::NaiveDate;
use enso_metrics_core::config::{BatchConfig, EngineConfig, MetricsConfig};
use enso_metrics_core::stubs::InMemoryFieldReader;
use enso_metrics_core::types::Frequency;
use enso_metrics_core::{EntityKind, FieldHandle, MetricRegistry, MetricsError, TimeSeries};

use super::*;
use crate::functions::{MetricAlgorithm, MetricFunction, RegressionRoles};

fn registry() -> Arc<MetricRegistry> {
    Arc::new(MetricRegistry::builtin().expect("built-in tables must validate"))
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()
}

/// `years` of an irregular monthly signal around `base` with amplitude `amp`.
fn signal(base: f64, amp: f64, years: usize) -> Vec<f64> {
    (0..years * 12)
        .map(|i| {
            let t = i as f64;
            base + amp * ((t * 0.31).sin() + 0.5 * (t * 0.047).cos())
        })
        .collect()
}

/// Model and reference both inside every collection's periods.
fn amplitude_reader(model_amp: f64, years: usize) -> InMemoryFieldReader {
    InMemoryFieldReader::new()
        .with_series("model.nc", "ts", TimeSeries::monthly(start(), signal(300.0, model_amp, years), "K"))
        .with_series("hadisst.nc", "sst", TimeSeries::monthly(start(), signal(27.0, 1.0, years), "degC"))
}

fn amplitude_request() -> ComputeRequest {
    ComputeRequest::new("ENSO_perf", "EnsoAmpl", "test-model")
        .with_model_handle("sst", "model.nc")
        .with_observation("sst", "HadISST")
        .with_observation_handle("HadISST", "hadisst.nc")
}

#[test]
fn test_try_new_rejects_invalid_config() {
    let config = EngineConfig {
        min_time_steps: 2,
        ..EngineConfig::default()
    };
    let err = MetricEngine::try_new(registry(), Arc::new(InMemoryFieldReader::new()), config)
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("min_time_steps"));
}

#[test]
fn test_from_config_builds_dedicated_pool() {
    let config = MetricsConfig {
        batch: BatchConfig { worker_threads: 2 },
        ..MetricsConfig::default()
    };
    let engine = MetricEngine::from_config(registry(), Arc::new(InMemoryFieldReader::new()), &config)
        .unwrap();
    let debug = format!("{:?}", engine);
    assert!(debug.contains("dedicated_pool: true"), "got {}", debug);
    assert_eq!(engine.functions().len(), 21);
}

#[test]
fn test_unregistered_metrics_are_listed() {
    let engine = MetricEngine::new(registry(), Arc::new(InMemoryFieldReader::new()));
    let missing = engine.unregistered_metrics("ENSO_perf").unwrap();
    assert!(missing.contains(&"EnsoDuration"));
    assert!(missing.contains(&"EnsoSstTsRmse"));
    assert!(!missing.contains(&"EnsoAmpl"));
    assert!(!missing.contains(&"BiasPrLatRmse"));
    assert!(engine.unregistered_metrics("ENSO_THF").unwrap().is_empty());
}

#[test]
fn test_unregistered_metric_fails_before_reading() {
    let reader = Arc::new(InMemoryFieldReader::new());
    let engine = MetricEngine::new(registry(), reader.clone());
    let request = ComputeRequest::new("ENSO_perf", "EnsoDuration", "test-model");
    let err = engine.compute(&request).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("EnsoDuration"));
    assert!(reader.requests().is_empty());
}

#[test]
fn test_arity_mismatch_is_configuration() {
    let mut functions = FunctionRegistry::new();
    functions.register(MetricFunction::new(
        "EnsoAmpl",
        "misregistered",
        MetricAlgorithm::Regression(RegressionRoles::new("sst", "taux")),
    ));
    let engine = MetricEngine::new(registry(), Arc::new(amplitude_reader(2.0, 25))).with_functions(functions);
    let err = engine.compute(&amplitude_request()).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("needs 2"), "got {}", err);
}

#[test]
fn test_missing_model_handle() {
    let engine = MetricEngine::new(registry(), Arc::new(amplitude_reader(2.0, 25)));
    let request = ComputeRequest::new("ENSO_perf", "EnsoAmpl", "test-model")
        .with_observation("sst", "HadISST")
        .with_observation_handle("HadISST", "hadisst.nc");
    match engine.compute(&request).unwrap_err() {
        MetricsError::Configuration { kind, id, reason } => {
            assert_eq!(kind, EntityKind::FieldHandle);
            assert_eq!(id, "ts");
            assert!(reason.contains("model"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_reader_failure_is_upstream() {
    let engine = MetricEngine::new(registry(), Arc::new(amplitude_reader(2.0, 25)));
    let request = amplitude_request().with_model_handle("sst", "elsewhere.nc");
    let err = engine.compute(&request).unwrap_err();
    assert!(err.is_upstream());
    assert!(err.to_string().contains("EnsoAmpl"));
    assert!(err.to_string().contains("'sst'"));
}

#[test]
fn test_amplitude_ratio_in_canonical_units() {
    let engine = MetricEngine::new(registry(), Arc::new(amplitude_reader(2.0, 25)));
    let result = engine.compute(&amplitude_request()).unwrap();

    assert_eq!(result.metric_id, "EnsoAmpl");
    assert_eq!(result.collection, "ENSO_perf");
    assert_eq!(result.units, "C");
    assert_eq!(result.model.identity, "test-model");
    assert_eq!(result.observations.identity, "HadISST");
    assert_eq!(result.regions["sst"], "nino3.4");
    assert_eq!(result.datasets["sst"], "HadISST");
    assert!(result.method.contains("nino3.4"));

    let model = result.model.value.unwrap();
    let obs = result.observations.value.unwrap();
    assert!((model / obs - 2.0).abs() < 1e-9);
    // abs_relative_difference: |2 - 1|
    assert!((result.metric - 1.0).abs() < 1e-9);
    assert!(result.metric_error.unwrap() > 0.0);
    assert!(!result.has_nonlinearity());
}

#[test]
fn test_model_period_is_restricted() {
    let engine = MetricEngine::new(registry(), Arc::new(amplitude_reader(1.0, 30)));
    let result = engine.compute(&amplitude_request()).unwrap();
    // 1990..2019 data, ENSO_perf models end in 2015
    assert!((result.model.years - 26.0).abs() < 1e-12);
    assert!((result.observations.years - 29.0).abs() < 1e-12);
}

#[test]
fn test_yearly_model_data_is_alignment_error() {
    let yearly = TimeSeries {
        start: start(),
        frequency: Frequency::Yearly,
        values: signal(300.0, 2.0, 25).into_iter().step_by(12).collect(),
        units: "K".to_string(),
    };
    let reader = amplitude_reader(1.0, 25).with_series("model.nc", "ts", yearly);
    let engine = MetricEngine::new(registry(), Arc::new(reader));

    let err = engine.compute(&amplitude_request()).unwrap_err();
    assert!(err.is_alignment());
    let message = err.to_string();
    assert!(message.contains("Yearly"), "got {}", message);
    assert!(message.contains("expects Monthly"), "got {}", message);
}

#[test]
fn test_request_prefers_native_handle() {
    let request = ComputeRequest::new("ENSO_THF", "EnsoFbSstThf", "m")
        .with_model_handle("thf", "all_fluxes.nc")
        .with_model_handle("rsus", "rsus.nc");
    assert_eq!(
        request.model_handle("thf", "rsus"),
        Some(&FieldHandle::new("rsus.nc"))
    );
    assert_eq!(
        request.model_handle("thf", "hfls"),
        Some(&FieldHandle::new("all_fluxes.nc"))
    );
    assert_eq!(request.model_handle("sst", "ts"), None);
}

#[test]
fn test_request_observation_handle_keys() {
    let request = ComputeRequest::new("ENSO_THF", "EnsoFbSstThf", "m")
        .with_observation_handle("ERA-Interim", "era.nc")
        .with_observation_handle("ERA-Interim/rlus", "era_rlus.nc");
    assert_eq!(
        request.observation_handle("ERA-Interim", "rlus"),
        Some(&FieldHandle::new("era_rlus.nc"))
    );
    assert_eq!(
        request.observation_handle("ERA-Interim", "hfls"),
        Some(&FieldHandle::new("era.nc"))
    );
    assert_eq!(request.observation_handle("Tropflux", "netflux"), None);
}

#[test]
fn test_for_metric_keeps_inputs() {
    let request = amplitude_request().with_region("sst", "nino3");
    let other = request.for_metric("ENSO_proc", "EnsoSstSkew");
    assert_eq!(other.metric, "EnsoSstSkew");
    assert_eq!(other.collection, "ENSO_proc");
    assert_eq!(other.model, request.model);
    assert_eq!(other.region_overrides, request.region_overrides);
}
