//! Metric collections and their resolution.

mod registry;
mod schema;


pub use registry::{MetricRegistry, ResolvedMetric};
pub use schema::{
    CollectionCatalog, CollectionSpec, CommonParameters, EventDefinition, InterpolationMethod,
    MetricComputation, MetricSpec, RegridSides, Regridding, Smoothing, VariableRequirement,
};
