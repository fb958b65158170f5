//! Default statistics kernels.
//!
//! [`DefaultKernels`] implements
//! [`StatisticsKernels`](enso_metrics_core::traits::StatisticsKernels) with
//! plain `f64` loops. Each concern lives in its own submodule and is usable
//! on its own:
//!
//! - [`series`]: detrending, annual-cycle anomalies, seasonal means
//! - [`moments`]: standard deviation and skewness
//! - [`regression`]: sign-partitioned OLS
//! - [`spatial`]: time means, profiles and RMSE

pub mod moments;
pub mod regression;
pub mod series;
pub mod spatial;


use enso_metrics_core::traits::{
    KernelResult, Profile, ProfileAxis, RegressionFit, SignPartition, StatisticsKernels,
};
use enso_metrics_core::types::{Detrending, Grid2D, GriddedField, Season, TimeSeries};

/// Stateless kernel set used when the caller supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKernels;

impl DefaultKernels {
    pub fn new() -> Self {
        Self
    }
}

impl StatisticsKernels for DefaultKernels {
    fn detrend(&self, series: &TimeSeries, method: Detrending) -> KernelResult<TimeSeries> {
        series::detrend(series, method)
    }

    fn anomalies(&self, series: &TimeSeries) -> KernelResult<TimeSeries> {
        series::anomalies(series)
    }

    fn seasonal_means(&self, series: &TimeSeries, season: Season) -> KernelResult<Vec<f64>> {
        series::seasonal_means(series, season)
    }

    fn std_dev(&self, values: &[f64]) -> KernelResult<f64> {
        moments::std_dev(values)
    }

    fn skewness(&self, values: &[f64]) -> KernelResult<f64> {
        moments::skewness(values)
    }

    fn regression(
        &self,
        independent: &[f64],
        dependent: &[f64],
        partition: SignPartition,
    ) -> KernelResult<RegressionFit> {
        regression::regression(independent, dependent, partition)
    }

    fn time_mean(&self, field: &GriddedField) -> KernelResult<Grid2D> {
        spatial::time_mean(field)
    }

    fn profile(&self, grid: &Grid2D, axis: ProfileAxis, area_weighted: bool) -> KernelResult<Profile> {
        spatial::profile(grid, axis, area_weighted)
    }

    fn rmse(
        &self,
        model: &[f64],
        observations: &[f64],
        weights: Option<&[f64]>,
        centered: bool,
    ) -> KernelResult<f64> {
        spatial::rmse(model, observations, weights, centered)
    }
}
