//! Inputs of a single metric computation.

use std::collections::BTreeMap;

use enso_metrics_core::FieldHandle;
use serde::{Deserialize, Serialize};

/// The simulation being evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInput {
    /// Model name reported in results.
    pub name: String,
    /// Handles keyed by native field name or canonical variable id. A native
    /// key wins, so composite terms can live in separate files.
    pub handles: BTreeMap<String, FieldHandle>,
}

/// Reference datasets chosen for the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationInput {
    /// Dataset id per canonical variable. Variables left out fall back to the
    /// engine's observation policy.
    pub datasets: BTreeMap<String, String>,
    /// Handles keyed by `"{dataset}/{native}"` or by dataset id.
    pub handles: BTreeMap<String, FieldHandle>,
}

/// One metric to compute.
///
/// ```
/// use enso_metrics_engine::ComputeRequest;
///
/// let request = ComputeRequest::new("ENSO_perf", "EnsoAmpl", "IPSL-CM5A-LR")
///     .with_model_handle("sst", "ts_Amon_IPSL-CM5A-LR_historical.nc")
///     .with_observation("sst", "HadISST")
///     .with_observation_handle("HadISST", "HadISST_sst.nc")
///     .with_region("sst", "nino3");
/// assert_eq!(request.region_overrides["sst"], "nino3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub collection: String,
    pub metric: String,
    pub model: ModelInput,
    pub observations: ObservationInput,
    /// Region per canonical variable, replacing the metric's default for this
    /// call only.
    pub region_overrides: BTreeMap<String, String>,
}

impl ComputeRequest {
    pub fn new(collection: &str, metric: &str, model_name: &str) -> Self {
        Self {
            collection: collection.to_string(),
            metric: metric.to_string(),
            model: ModelInput {
                name: model_name.to_string(),
                handles: BTreeMap::new(),
            },
            ..Self::default()
        }
    }

    pub fn with_model_handle(mut self, key: &str, handle: impl Into<FieldHandle>) -> Self {
        self.model.handles.insert(key.to_string(), handle.into());
        self
    }

    pub fn with_observation(mut self, variable: &str, dataset: &str) -> Self {
        self.observations
            .datasets
            .insert(variable.to_string(), dataset.to_string());
        self
    }

    pub fn with_observation_handle(mut self, key: &str, handle: impl Into<FieldHandle>) -> Self {
        self.observations.handles.insert(key.to_string(), handle.into());
        self
    }

    pub fn with_region(mut self, variable: &str, region: &str) -> Self {
        self.region_overrides
            .insert(variable.to_string(), region.to_string());
        self
    }

    /// Same inputs aimed at another metric.
    pub fn for_metric(&self, collection: &str, metric: &str) -> Self {
        Self {
            collection: collection.to_string(),
            metric: metric.to_string(),
            ..self.clone()
        }
    }

    pub(crate) fn model_handle(&self, variable: &str, native: &str) -> Option<&FieldHandle> {
        self.model
            .handles
            .get(native)
            .or_else(|| self.model.handles.get(variable))
    }

    pub(crate) fn observation_handle(&self, dataset: &str, native: &str) -> Option<&FieldHandle> {
        self.observations
            .handles
            .get(&format!("{}/{}", dataset, native))
            .or_else(|| self.observations.handles.get(dataset))
    }
}
