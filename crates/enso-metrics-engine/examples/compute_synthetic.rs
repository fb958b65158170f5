//! Synthetic ENSO_proc run
//!
//! Computes every metric of the `ENSO_proc` collection against synthetic
//! model and reference data served from memory, then prints each result.
//! No files are read; handles are plain labels.
//!
//! Run with: `cargo run --package enso-metrics-engine --example compute_synthetic`
//!
//! Logging follows `config/default.toml` or `RUST_LOG` when set.

use std::sync::Arc;

use chrono::NaiveDate;
use enso_metrics_core::config::LoggingConfig;
use enso_metrics_core::stubs::InMemoryFieldReader;
use enso_metrics_core::types::{GridAxes, GriddedField};
use enso_metrics_core::{MetricRegistry, MetricsConfig, MetricsResult, TimeSeries};
use enso_metrics_engine::{ComputeRequest, MetricEngine};
use tracing_subscriber::EnvFilter;

const COLLECTION: &str = "ENSO_proc";
const START_YEAR: i32 = 1980;
const YEARS: usize = 30;

/// Reference dataset serving each model variable in this run.
const REFERENCES: [(&str, &str); 4] = [
    ("sst", "ERA-Interim"),
    ("taux", "ERA-Interim"),
    ("thf", "ERA-Interim"),
    ("ssh", "AVISO"),
];

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);
    if logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.pretty().init();
    }
}

/// Anomaly shared by every field, phase shifted per term so terms differ.
fn anomaly(step: usize, phase: f64) -> f64 {
    let t = step as f64 + phase;
    (t * 0.27).sin() + 0.4 * (t * 0.061).cos() + 0.15 * (t * 1.1).sin().powi(3)
}

fn synthetic_series(base: f64, amp: f64, phase: f64, units: &str) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(START_YEAR, 1, 1).unwrap_or_default();
    let values = (0..YEARS * 12).map(|i| base + amp * anomaly(i, phase)).collect();
    TimeSeries::monthly(start, values, units)
}

fn synthetic_field(base: f64, amp: f64, phase: f64, units: &str) -> GriddedField {
    let start = NaiveDate::from_ymd_opt(START_YEAR, 1, 1).unwrap_or_default();
    let lat: Vec<f64> = (0..7).map(|i| -15.0 + 5.0 * i as f64).collect();
    let lon: Vec<f64> = (0..35).map(|i| 120.0 + 5.0 * i as f64).collect();
    let axes = GridAxes::new(lat.clone(), lon.clone());
    let mut data = Vec::with_capacity(YEARS * 12 * axes.cells());
    for step in 0..YEARS * 12 {
        let a = amp * anomaly(step, phase);
        for y in &lat {
            for x in &lon {
                // warm pool in the west, cold tongue in the east
                let zonal = (x - 200.0) / 100.0;
                data.push(base + a - 0.3 * amp * zonal - 0.02 * amp * y.abs());
            }
        }
    }
    GriddedField::monthly(start, axes, data, units)
}

/// Typical magnitude and anomaly size for fields in `units`.
fn scale_for(units: &str) -> (f64, f64) {
    match units {
        "K" => (300.0, 1.0),
        "degC" => (27.0, 1.0),
        "Pa" | "N m-2" => (-0.04, 0.01),
        "m" => (0.0, 0.05),
        _ => (100.0, 10.0),
    }
}

fn insert_terms(
    reader: &mut InMemoryFieldReader,
    handle: &str,
    terms: &[String],
    units: &str,
    amp_factor: f64,
) {
    let (base, amp) = scale_for(units);
    for (i, term) in terms.iter().enumerate() {
        let phase = 3.0 * i as f64;
        reader.insert_series(handle, term, synthetic_series(base, amp * amp_factor, phase, units));
        reader.insert_field(handle, term, synthetic_field(base, amp * amp_factor, phase, units));
    }
}

fn build_reader(registry: &MetricRegistry) -> MetricsResult<InMemoryFieldReader> {
    let mut reader = InMemoryFieldReader::new();
    for (variable, dataset) in REFERENCES {
        let units = registry.variables().lookup(variable)?.units.clone();

        let model_terms: Vec<String> = registry
            .variables()
            .expand(variable)?
            .into_iter()
            .map(|t| t.name)
            .collect();
        insert_terms(&mut reader, "model", &model_terms, &units, 1.3);

        let reference_terms: Vec<String> = registry
            .observations()
            .lookup(dataset)?
            .expand(variable)?
            .into_iter()
            .map(|t| t.name)
            .collect();
        insert_terms(&mut reader, dataset, &reference_terms, &units, 1.0);
    }
    Ok(reader)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = MetricsConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    println!("=== Synthetic {} Run ===\n", COLLECTION);

    let registry = Arc::new(MetricRegistry::builtin()?);
    let reader = build_reader(&registry)?;
    let engine = MetricEngine::from_config(registry, Arc::new(reader), &config)?;

    let unregistered = engine.unregistered_metrics(COLLECTION)?;
    println!("Metrics without a computation: {:?}\n", unregistered);

    let mut template = ComputeRequest::new(COLLECTION, "", "synthetic-model");
    for (variable, dataset) in REFERENCES {
        template = template
            .with_model_handle(variable, "model")
            .with_observation(variable, dataset)
            .with_observation_handle(dataset, dataset);
    }

    let outcomes = engine.compute_collection(COLLECTION, &template)?;
    let mut computed = 0;
    for (metric, outcome) in &outcomes {
        println!("--- {} ---", metric);
        match outcome {
            Ok(result) => {
                computed += 1;
                println!("  Category: {:?}", result.category);
                println!("  Metric: {:.4} {}", result.metric, result.units);
                if let Some(error) = result.metric_error {
                    println!("  Error: {:.4}", error);
                }
                if let (Some(model), Some(obs)) = (result.model.value, result.observations.value) {
                    println!("  Model: {:.4}  Reference: {:.4}", model, obs);
                }
                if let Some(nl) = &result.nonlinearity {
                    println!("  Nonlinearity metric: {:.4}", nl.metric);
                }
                println!("  References: {}", result.observations.identity);
                println!("  Method: {}\n", result.method);
                assert!(result.metric.is_finite());
            }
            Err(e) => println!("  Not computed ({}): {}\n", e.kind_name(), e),
        }
    }

    assert!(computed > 0);
    assert!(computed + unregistered.len() <= outcomes.len());
    println!("=== {} of {} metrics computed ===", computed, outcomes.len());
    Ok(())
}
