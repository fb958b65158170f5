//! Metric functions: which algorithm computes each metric id.
//!
//! Every registered metric belongs to one of three categories
//! ([`MetricCategory`]):
//!
//! - **self statistics** run once on the model and once on the reference,
//!   and the two values are normalized as a ratio
//! - **regressions** fit one anomaly on another over all points and over
//!   each sign of the independent anomaly; the sign split yields the
//!   nonlinearity channel
//! - **comparisons** reduce model and reference jointly to one value
//!
//! Algorithms here are pure functions of prepared series and fields; the
//! engine handles reading, unit conversion and alignment.

mod compare;
mod registry;
mod regression;
mod self_stats;


use std::collections::BTreeMap;

use enso_metrics_core::traits::{KernelResult, ProfileAxis, StatisticsKernels};
use enso_metrics_core::types::{Detrending, TimeSeries};
use enso_metrics_core::MetricCategory;
use serde::{Deserialize, Serialize};

pub use compare::{compare_profiles, CompareOptions, RegridPlan};
pub use registry::FunctionRegistry;
pub use regression::regression_statistic;
pub use self_stats::self_statistic;

/// Statistic of a single field on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfStatistic {
    /// Standard deviation of anomalies.
    Amplitude,
    /// Ratio of NDJ to MAM standard deviation.
    Seasonality,
    Skewness,
}

/// Which variable of a regression is which, by canonical id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionRoles {
    pub independent: String,
    pub dependent: String,
    /// Factor applied to slopes and their errors.
    pub scale: f64,
}

impl RegressionRoles {
    pub fn new(independent: &str, dependent: &str) -> Self {
        Self {
            independent: independent.to_string(),
            dependent: dependent.to_string(),
            scale: 1.0,
        }
    }

    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// The computation behind a metric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricAlgorithm {
    SelfStatistic(SelfStatistic),
    Regression(RegressionRoles),
    /// RMSE between model and reference time-mean profiles along an axis.
    ProfileRmse(ProfileAxis),
}

impl MetricAlgorithm {
    pub fn category(&self) -> MetricCategory {
        match self {
            Self::SelfStatistic(_) => MetricCategory::SingleFieldSelf,
            Self::Regression(_) => MetricCategory::TwoFieldRegression,
            Self::ProfileRmse(_) => MetricCategory::SingleFieldCompare,
        }
    }

    /// Canonical variables the algorithm needs by name, if it names any.
    pub fn required_variables(&self) -> Vec<&str> {
        match self {
            Self::Regression(roles) => vec![roles.independent.as_str(), roles.dependent.as_str()],
            Self::SelfStatistic(_) | Self::ProfileRmse(_) => Vec::new(),
        }
    }
}

/// A registered metric: its algorithm plus the labels reported with results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFunction {
    pub id: String,
    pub long_name: String,
    pub algorithm: MetricAlgorithm,
    /// Result units. `None` reports the canonical units of the variable.
    pub units: Option<String>,
    pub reference: String,
}

impl MetricFunction {
    pub fn new(id: &str, long_name: &str, algorithm: MetricAlgorithm) -> Self {
        Self {
            id: id.to_string(),
            long_name: long_name.to_string(),
            algorithm,
            units: None,
            reference: String::new(),
        }
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_string();
        self
    }

    pub fn category(&self) -> MetricCategory {
        self.algorithm.category()
    }

    /// Human-readable method for the variables and regions actually used.
    ///
    /// `regions` maps each canonical variable to its region id; `variables`
    /// lists them in the metric's declaration order.
    pub fn describe(&self, variables: &[&str], regions: &BTreeMap<String, String>) -> String {
        let region = |v: &str| regions.get(v).map(String::as_str).unwrap_or("?");
        let first = variables.first().copied().unwrap_or("?");
        match &self.algorithm {
            MetricAlgorithm::SelfStatistic(SelfStatistic::Amplitude) => {
                format!("Standard deviation of {}A in {}", first, region(first))
            }
            MetricAlgorithm::SelfStatistic(SelfStatistic::Seasonality) => format!(
                "Ratio between NDJ and MAM standard deviation of {}A in {}",
                first,
                region(first)
            ),
            MetricAlgorithm::SelfStatistic(SelfStatistic::Skewness) => {
                format!("Skewness of {}A in {}", first, region(first))
            }
            MetricAlgorithm::Regression(roles) => format!(
                "Regression of {} {}A over {} {}A",
                region(&roles.dependent),
                roles.dependent,
                region(&roles.independent),
                roles.independent
            ),
            MetricAlgorithm::ProfileRmse(ProfileAxis::Longitude) => format!(
                "Root mean square error of the meridional-mean time-mean {} in {}",
                first,
                region(first)
            ),
            MetricAlgorithm::ProfileRmse(ProfileAxis::Latitude) => format!(
                "Root mean square error of the zonal-mean time-mean {} in {}",
                first,
                region(first)
            ),
        }
    }
}

/// Result of running an algorithm on one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideStatistic {
    pub value: f64,
    pub error: f64,
    /// Record length in years.
    pub years: f64,
    /// `(value, error)` of the nonlinearity channel, regressions only.
    pub nonlinearity: Option<(f64, f64)>,
}

/// Detrend, then remove the annual cycle.
pub fn preprocess(
    kernels: &dyn StatisticsKernels,
    series: &TimeSeries,
    detrending: Detrending,
) -> KernelResult<TimeSeries> {
    let detrended = kernels.detrend(series, detrending)?;
    kernels.anomalies(&detrended)
}
