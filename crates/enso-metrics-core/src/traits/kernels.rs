//! Numerical kernels used by the metric algorithms.

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::types::{Detrending, Grid2D, GriddedField, Season, TimeSeries};

pub type KernelResult<T> = Result<T, CollaboratorError>;

/// Subset of paired samples used in a regression, selected by the sign of the
/// independent anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPartition {
    All,
    /// Independent anomaly >= 0.
    Positive,
    /// Independent anomaly < 0.
    Negative,
}

impl SignPartition {
    pub fn all() -> [SignPartition; 3] {
        [Self::All, Self::Positive, Self::Negative]
    }

    pub fn includes(&self, independent: f64) -> bool {
        match self {
            Self::All => true,
            Self::Positive => independent >= 0.0,
            Self::Negative => independent < 0.0,
        }
    }
}

/// Ordinary least squares slope with its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub stderr: f64,
    /// Samples used in the fit.
    pub samples: usize,
}

/// Axis a time-mean map is reduced onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileAxis {
    /// Meridional mean; values vary with longitude.
    Longitude,
    /// Zonal mean; values vary with latitude.
    Latitude,
}

/// One-dimensional reduction of a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub axis: ProfileAxis,
    pub coords: Vec<f64>,
    pub values: Vec<f64>,
    /// Weight of each point when the profile itself is averaged.
    pub weights: Vec<f64>,
}

/// Statistics over series and fields.
///
/// Series arguments are expected in canonical units and already aligned;
/// kernels report too-short input as
/// [`CollaboratorError::InsufficientSamples`] and incompatible arrays as
/// [`CollaboratorError::ShapeMismatch`].
pub trait StatisticsKernels: Send + Sync {
    /// Remove a trend fitted over the whole series.
    fn detrend(&self, series: &TimeSeries, method: Detrending) -> KernelResult<TimeSeries>;

    /// Remove the mean annual cycle (monthly data) or the mean (yearly data).
    fn anomalies(&self, series: &TimeSeries) -> KernelResult<TimeSeries>;

    /// Mean of each complete occurrence of `season`, in time order.
    fn seasonal_means(&self, series: &TimeSeries, season: Season) -> KernelResult<Vec<f64>>;

    /// Sample standard deviation (n - 1 denominator).
    fn std_dev(&self, values: &[f64]) -> KernelResult<f64>;

    fn skewness(&self, values: &[f64]) -> KernelResult<f64>;

    /// Regress `dependent` on `independent` over the samples selected by
    /// `partition`.
    fn regression(
        &self,
        independent: &[f64],
        dependent: &[f64],
        partition: SignPartition,
    ) -> KernelResult<RegressionFit>;

    fn time_mean(&self, field: &GriddedField) -> KernelResult<Grid2D>;

    /// Collapse a map onto one axis, optionally weighting latitudes by their
    /// cosine.
    fn profile(&self, grid: &Grid2D, axis: ProfileAxis, area_weighted: bool) -> KernelResult<Profile>;

    /// Root-mean-square difference. `centered` removes each side's weighted
    /// mean first.
    fn rmse(
        &self,
        model: &[f64],
        observations: &[f64],
        weights: Option<&[f64]>,
        centered: bool,
    ) -> KernelResult<f64>;
}
