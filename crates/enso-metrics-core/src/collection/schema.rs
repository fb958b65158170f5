//! Typed schema for metric collections.
//!
//! These types mirror the collection tables one-to-one; unknown keys are
//! rejected at load so misspelled parameters cannot silently fall back to
//! defaults.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{EntityKind, MetricsError, MetricsResult};
use crate::types::{Detrending, Frequency, TimeWindow};

/// One variable consumed by a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableRequirement {
    pub variable: String,
    /// Default region, overridable per call.
    pub region: String,
    /// Acceptable observation datasets in order of preference.
    pub observations: Vec<String>,
}

/// Threshold-based ENSO event selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDefinition {
    pub region: String,
    /// Month or season the index is evaluated in, e.g. `DEC`.
    pub season: String,
    pub threshold: f64,
    /// Threshold expressed in standard deviations of the index. Unset means
    /// the collection's `normalization` flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<bool>,
}

/// Running-mean smoothing applied to time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Smoothing {
    pub window: usize,
    /// Kernel shape, e.g. `triangle`.
    pub method: String,
}

/// Which side(s) of a comparison are moved onto another grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegridSides {
    /// Model onto the observation grid.
    #[default]
    Model,
    /// Observations onto the model grid.
    Observations,
    /// Both onto the named target grid.
    Both,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    Nearest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Regridding {
    #[serde(default)]
    pub sides: RegridSides,
    /// Regridding package the definition was written against.
    pub regridder: String,
    pub tool: String,
    pub method: InterpolationMethod,
    /// Target grid name such as `generic_1x1deg`.
    pub target_grid: String,
}

/// How model and observed statistics are reduced to one number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricComputation {
    /// `model / obs`.
    #[default]
    Ratio,
    /// `|model - obs| / |obs|`.
    AbsRelativeDifference,
}

/// Definition of one metric within a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSpec {
    pub id: String,
    pub variables: Vec<VariableRequirement>,
    #[serde(default)]
    pub metric_computation: MetricComputation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbr_years_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_definition: Option<EventDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<Smoothing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regridding: Option<Regridding>,
}

impl MetricSpec {
    pub fn arity(&self) -> usize {
        self.variables.len()
    }

    pub fn requirement(&self, variable: &str) -> Option<&VariableRequirement> {
        self.variables.iter().find(|r| r.variable == variable)
    }

    pub fn variable_ids(&self) -> Vec<&str> {
        self.variables.iter().map(|r| r.variable.as_str()).collect()
    }

    /// Every region id the metric refers to, including its event region.
    pub fn region_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.variables.iter().map(|r| r.region.as_str()).collect();
        if let Some(event) = &self.event_definition {
            ids.push(event.region.as_str());
        }
        ids
    }

    fn validate(&self, collection: &str) -> MetricsResult<()> {
        let invalid = |reason: String| {
            MetricsError::configuration(EntityKind::Metric, format!("{}/{}", collection, self.id), reason)
        };

        if !(1..=2).contains(&self.arity()) {
            return Err(invalid(format!("expects 1 or 2 variables, declares {}", self.arity())));
        }
        for (i, req) in self.variables.iter().enumerate() {
            if self.variables[..i].iter().any(|r| r.variable == req.variable) {
                return Err(invalid(format!("variable '{}' listed twice", req.variable)));
            }
            if req.observations.is_empty() {
                return Err(invalid(format!(
                    "variable '{}' has no acceptable observation dataset",
                    req.variable
                )));
            }
        }
        if let Some(smoothing) = &self.smoothing {
            if smoothing.window == 0 {
                return Err(invalid("smoothing window must be positive".to_string()));
            }
        }
        if self.nbr_years_window == Some(0) {
            return Err(invalid("nbr_years_window must be positive".to_string()));
        }
        Ok(())
    }
}

/// Parameters shared by every metric of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommonParameters {
    pub detrending: Detrending,
    pub frequency: Frequency,
    pub min_time_steps: usize,
    /// Default for event definitions that leave `normalization` unset.
    pub normalization: bool,
    pub project_interpreter: String,
    pub observed_period: TimeWindow,
    pub modeled_period: TimeWindow,
}

/// A named, ordered set of metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionSpec {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub long_name: String,
    pub description: String,
    pub plot_order: Vec<String>,
    pub common: CommonParameters,
    pub metrics: Vec<MetricSpec>,
}

impl CollectionSpec {
    pub fn metric(&self, id: &str) -> Option<&MetricSpec> {
        self.metrics.iter().find(|m| m.id == id)
    }

    /// Metric ids in declaration order.
    pub fn metric_ids(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.id.as_str()).collect()
    }
}

impl CatalogEntry for CollectionSpec {
    const KIND: EntityKind = EntityKind::Collection;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> MetricsResult<()> {
        let invalid = |reason: String| MetricsError::configuration(EntityKind::Collection, &self.id, reason);

        if self.metrics.is_empty() {
            return Err(invalid("declares no metrics".to_string()));
        }
        if self.common.min_time_steps == 0 {
            return Err(invalid("min_time_steps must be positive".to_string()));
        }
        if !self.common.modeled_period.is_valid() {
            return Err(invalid(format!("modeled_period {} is empty", self.common.modeled_period)));
        }
        if !self.common.observed_period.is_valid() {
            return Err(invalid(format!("observed_period {} is empty", self.common.observed_period)));
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            if self.metrics[..i].iter().any(|m| m.id == metric.id) {
                return Err(invalid(format!("metric '{}' declared twice", metric.id)));
            }
            metric.validate(&self.id)?;
        }
        for entry in &self.plot_order {
            if self.metric(entry).is_none() {
                return Err(invalid(format!("plot_order lists unknown metric '{}'", entry)));
            }
        }
        Ok(())
    }
}

pub type CollectionCatalog = Catalog<CollectionSpec>;
