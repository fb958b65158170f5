//! Integration tests for dataset selection, batches and concurrent use.

mod common;

use std::sync::Arc;
use std::thread;

use enso_metrics_core::config::{BatchConfig, EngineConfig};
use enso_metrics_core::{
    EntityKind, MetricResult, MetricsError, MetricsResult, ObservationPolicy,
};
use enso_metrics_engine::{ComputeRequest, MetricEngine};

use common::{engine, full_reader, full_template, registry};

fn same_outcome(a: &MetricsResult<MetricResult>, b: &MetricsResult<MetricResult>) -> bool {
    match (a, b) {
        (Ok(a), Ok(b)) => a == b,
        (Err(a), Err(b)) => a.kind_name() == b.kind_name() && a.to_string() == b.to_string(),
        _ => false,
    }
}

#[test]
fn test_first_listed_reference_by_default() {
    let result = engine(full_reader(2.0))
        .compute(&full_template("EnsoAmpl"))
        .unwrap();
    assert_eq!(result.datasets["sst"], "RefA");
    assert!((result.metric - 2.0).abs() < 1e-9, "ratio {}", result.metric);
}

#[test]
fn test_require_explicit_policy() {
    let config = EngineConfig {
        observation_policy: ObservationPolicy::RequireExplicit,
        ..EngineConfig::default()
    };
    let engine = MetricEngine::try_new(registry(), Arc::new(full_reader(2.0)), config).unwrap();

    let err = engine.compute(&full_template("EnsoAmpl")).unwrap_err();
    assert!(err.is_configuration());

    let result = engine
        .compute(&full_template("EnsoAmpl").with_observation("sst", "RefA"))
        .unwrap();
    assert_eq!(result.observations.identity, "RefA");
}

#[test]
fn test_reference_outside_acceptable_list() {
    let err = engine(full_reader(2.0))
        .compute(&full_template("EnsoSstSkew").with_observation("sst", "RefB"))
        .unwrap_err();
    match err {
        MetricsError::Configuration { kind, id, .. } => {
            assert_eq!(kind, EntityKind::ObservationDataset);
            assert_eq!(id, "RefB");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_unknown_metric_is_named() {
    let err = engine(full_reader(2.0))
        .compute(&full_template("EnsoAmplitude"))
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("EnsoAmplitude"));
}

#[test]
fn test_collection_results_follow_declaration_order() {
    let engine = engine(full_reader(2.0));
    let outcomes = engine
        .compute_collection("test", &full_template("EnsoAmpl"))
        .unwrap();

    let ids: Vec<&str> = outcomes.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, engine.registry().list_metrics("test").unwrap());

    for (id, outcome) in &outcomes {
        match id.as_str() {
            "EnsoDuration" => {
                let err = outcome.as_ref().unwrap_err();
                assert!(err.is_configuration());
                assert!(err.to_string().contains("no computation"));
            }
            _ => {
                let result = outcome.as_ref().unwrap_or_else(|e| panic!("{} failed: {}", id, e));
                assert_eq!(&result.metric_id, id);
                assert!(result.metric.is_finite());
            }
        }
    }
}

#[test]
fn test_unknown_collection_fails_whole_run() {
    let err = engine(full_reader(2.0))
        .compute_collection("ENSO_nope", &full_template("EnsoAmpl"))
        .unwrap_err();
    assert!(err.is_configuration());
}

fn mixed_requests() -> Vec<ComputeRequest> {
    let mut requests = Vec::new();
    for metric in ["EnsoAmpl", "EnsoSstSkew", "EnsoFbSstTaux", "EnsoFbSstLwr", "BiasSstLonRmse", "EnsoDuration"] {
        requests.push(full_template(metric));
        requests.push(full_template(metric).with_region("sst", "nino4"));
    }
    requests.push(full_template("BiasTauxLonRmse").with_region("taux", "eastern_pacific"));
    requests
}

#[test]
fn test_batch_matches_sequential() {
    let engine = engine(full_reader(1.5));
    let requests = mixed_requests();

    let sequential: Vec<_> = requests.iter().map(|r| engine.compute(r)).collect();
    let parallel = engine.compute_batch(&requests);

    assert_eq!(sequential.len(), parallel.len());
    for (s, p) in sequential.iter().zip(&parallel) {
        assert!(same_outcome(s, p));
    }
}

#[test]
fn test_dedicated_pool_matches_global_pool() {
    let requests = mixed_requests();
    let global = engine(full_reader(1.5)).compute_batch(&requests);
    let pooled = engine(full_reader(1.5))
        .with_batch_config(&BatchConfig { worker_threads: 3 })
        .unwrap()
        .compute_batch(&requests);
    assert!(global.iter().zip(&pooled).all(|(a, b)| same_outcome(a, b)));
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = engine(full_reader(2.0));
    let request = full_template("EnsoFbSstTaux");
    let expected = engine.compute(&request).unwrap();

    let results: Vec<MetricResult> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.compute(&request).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.iter().all(|r| r == &expected));
}

#[test]
fn test_result_serializes_for_reporting() {
    let result = engine(full_reader(2.0))
        .compute(&full_template("EnsoFbSstTaux"))
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["metric_id"], "EnsoFbSstTaux");
    assert_eq!(json["category"], "two_field_regression");
    assert_eq!(json["regions"]["taux"], "nino4");
    assert!(json["nonlinearity"]["metric"].is_number());
    assert_eq!(json["model"]["identity"], "synthetic-model");
}
