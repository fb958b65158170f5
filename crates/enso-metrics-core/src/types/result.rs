//! Metric computation results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three computation shapes a metric can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    /// One statistic per dataset, model and observation computed separately.
    SingleFieldSelf,
    /// Regression of one field on another, with a nonlinearity channel.
    TwoFieldRegression,
    /// Model and observation compared jointly; the statistic is the metric.
    SingleFieldCompare,
}

impl MetricCategory {
    pub fn all() -> [MetricCategory; 3] {
        [
            Self::SingleFieldSelf,
            Self::TwoFieldRegression,
            Self::SingleFieldCompare,
        ]
    }

    /// Number of variables a metric of this category consumes.
    pub fn arity(&self) -> usize {
        match self {
            Self::TwoFieldRegression => 2,
            Self::SingleFieldSelf | Self::SingleFieldCompare => 1,
        }
    }

    /// Whether the statistic is computed separately for model and observation
    /// and then normalized as a ratio.
    pub fn is_normalized(&self) -> bool {
        !matches!(self, Self::SingleFieldCompare)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SingleFieldSelf => "statistic of a single field, normalized by its observed counterpart",
            Self::TwoFieldRegression => "regression slope between two fields with sign-partitioned nonlinearity",
            Self::SingleFieldCompare => "direct comparison of model and observed fields",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SingleFieldSelf => "single_field_self",
            Self::TwoFieldRegression => "two_field_regression",
            Self::SingleFieldCompare => "single_field_compare",
        };
        f.write_str(s)
    }
}

/// Per-dataset statistic on one side of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Model name, or the observation dataset per variable joined with `+`.
    pub identity: String,
    /// Statistic for this side. `None` for compare metrics, where only the
    /// joint value exists.
    pub value: Option<f64>,
    pub value_error: Option<f64>,
    /// Length of the record the statistic was computed on.
    pub years: f64,
}

/// Ratio of the sign-partitioned regression slopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonlinearityBreakdown {
    pub model: f64,
    pub model_error: f64,
    pub observations: f64,
    pub observations_error: f64,
    pub metric: f64,
    pub metric_error: f64,
}

/// Outcome of one metric computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric_id: String,
    pub long_name: String,
    pub collection: String,
    pub category: MetricCategory,
    /// Normalized comparison value.
    pub metric: f64,
    /// Propagated uncertainty of `metric`, absent for compare metrics.
    pub metric_error: Option<f64>,
    pub units: String,
    pub method: String,
    pub reference: String,
    pub comment: String,
    pub model: SideSummary,
    pub observations: SideSummary,
    /// Observation dataset used for each variable.
    pub datasets: BTreeMap<String, String>,
    /// Region used for each variable, after overrides.
    pub regions: BTreeMap<String, String>,
    pub nonlinearity: Option<NonlinearityBreakdown>,
}

impl MetricResult {
    pub fn has_nonlinearity(&self) -> bool {
        self.nonlinearity.is_some()
    }

    /// Serialize for the reporting layer.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
