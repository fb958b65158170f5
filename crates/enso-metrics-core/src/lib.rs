//! Metric definition registry for ENSO model evaluation.
//!
//! This crate holds everything a metric computation needs to know before any
//! data is read: which regions, variables and reference datasets exist, how
//! canonical variables map onto stored fields, and which metrics make up each
//! named collection.
//!
//! # Modules
//!
//! - [`catalog`]: region, variable and observation-dataset catalogs
//! - [`collection`]: collection schema and the [`MetricRegistry`]
//! - [`config`]: engine, logging and batch settings
//! - [`error`]: [`MetricsError`] and [`CollaboratorError`]
//! - [`global`]: process-wide registry initialized once at startup
//! - [`tables`]: embedded TOML definition tables
//! - [`traits`]: contracts for field readers, statistics kernels and regridders
//! - [`types`]: time axes, fields and [`MetricResult`]
//! - [`stubs`]: in-memory collaborators (`test-utils` feature only)
//!
//! # Example
//!
//! ```
//! use enso_metrics_core::MetricRegistry;
//!
//! let registry = MetricRegistry::builtin().unwrap();
//! let resolved = registry.resolve("ENSO_perf", "EnsoAmpl").unwrap();
//! assert_eq!(resolved.spec.variables[0].region, "nino3.4");
//!
//! let terms = registry.variables().expand("thf").unwrap();
//! assert_eq!(terms.len(), 6);
//! ```

pub mod catalog;
pub mod collection;
pub mod config;
pub mod error;
pub mod global;
pub mod stubs;
pub mod tables;
pub mod traits;
pub mod types;

pub use catalog::{FieldExpr, ObservationDataset, PrimitiveTerm, Region, Sign, UnitKind, Variable};
pub use collection::{CollectionSpec, CommonParameters, MetricRegistry, MetricSpec, ResolvedMetric};
pub use config::{MetricsConfig, NonlinearityRatio, ObservationPolicy};
pub use error::{CollaboratorError, EntityKind, MetricsError, MetricsResult};
pub use global::{global_registry, initialize_global_registry};
pub use tables::TableSources;
pub use types::{FieldHandle, MetricCategory, MetricResult, TimeSeries};
