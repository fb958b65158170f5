//! Metric computation engine for ENSO model evaluation.
//!
//! Given a [`MetricRegistry`](enso_metrics_core::MetricRegistry) and a
//! [`FieldReader`](enso_metrics_core::traits::FieldReader), the
//! [`MetricEngine`] turns a [`ComputeRequest`] (collection, metric, model
//! and reference handles) into a
//! [`MetricResult`](enso_metrics_core::MetricResult).
//!
//! # Modules
//!
//! - [`engine`]: the engine, requests and parallel batches
//! - [`functions`]: metric id to algorithm table and the algorithms
//! - [`kernels`]: default statistics kernels
//! - [`normalize`]: model/reference ratios and error propagation
//! - [`alignment`]: period restriction and overlap checks
//! - [`units`]: conversion to canonical units
//! - [`regrid`]: axis-aligned regridding
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use enso_metrics_core::stubs::InMemoryFieldReader;
//! use enso_metrics_core::MetricRegistry;
//! use enso_metrics_engine::MetricEngine;
//!
//! let registry = Arc::new(MetricRegistry::builtin().unwrap());
//! let engine = MetricEngine::new(registry, Arc::new(InMemoryFieldReader::new()));
//! assert!(engine.functions().contains("EnsoFbSstTaux"));
//! assert!(engine.unregistered_metrics("ENSO_perf").unwrap().contains(&"EnsoDuration"));
//! ```

pub mod alignment;
pub mod engine;
pub mod functions;
pub mod kernels;
pub mod normalize;
pub mod regrid;
pub mod units;

pub use engine::{ComputeRequest, MetricEngine, ModelInput, ObservationInput};
pub use functions::FunctionRegistry;
pub use kernels::DefaultKernels;
pub use regrid::AxisRegridder;
