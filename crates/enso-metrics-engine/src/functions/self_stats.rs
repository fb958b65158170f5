//! Single-field statistics.

use enso_metrics_core::traits::StatisticsKernels;
use enso_metrics_core::types::{Season, TimeAxis, TimeSeries};
use enso_metrics_core::{CollaboratorError, MetricsError, MetricsResult};

use super::{SelfStatistic, SideStatistic};
use crate::kernels::moments::skewness_stderr;
use crate::normalize;

/// Compute `stat` on an anomaly series.
///
/// Errors follow the standard error of each estimator:
///
/// ```text
/// amplitude    std / sqrt(years)
/// seasonality  quotient rule on std(NDJ) / sqrt(years - 1) and std(MAM) / sqrt(years)
/// skewness     sqrt(6 n (n - 1) / ((n - 2) (n + 1) (n + 3)))
/// ```
///
/// Kernel failures are upstream errors of `variable`; a seasonality with no
/// MAM variability is a numeric error.
pub fn self_statistic(
    kernels: &dyn StatisticsKernels,
    stat: SelfStatistic,
    anomalies: &TimeSeries,
    metric: &str,
    variable: &str,
) -> MetricsResult<SideStatistic> {
    let upstream = |e: CollaboratorError| MetricsError::upstream(metric, variable, e);
    let years = anomalies.years();
    let (value, error) = match stat {
        SelfStatistic::Amplitude => {
            let std = kernels.std_dev(&anomalies.values).map_err(upstream)?;
            (std, std / years.sqrt())
        }
        SelfStatistic::Seasonality => {
            if years <= 1.0 {
                return Err(upstream(CollaboratorError::insufficient(
                    "seasonality",
                    2 * anomalies.frequency.steps_per_year(),
                    anomalies.len(),
                )));
            }
            let seasonal_std = |season: Season| {
                kernels
                    .seasonal_means(anomalies, season)
                    .and_then(|means| kernels.std_dev(&means))
                    .map_err(upstream)
            };
            let ndj = seasonal_std(Season::Ndj)?;
            let mam = seasonal_std(Season::Mam)?;
            if mam == 0.0 {
                return Err(MetricsError::numeric(
                    metric,
                    format!("MAM standard deviation of '{}' is zero", variable),
                ));
            }
            let n = normalize::ratio(
                metric,
                ndj,
                ndj / (years - 1.0).sqrt(),
                mam,
                mam / years.sqrt(),
            )?;
            (n.metric, n.error)
        }
        SelfStatistic::Skewness => {
            let skew = kernels.skewness(&anomalies.values).map_err(upstream)?;
            (skew, skewness_stderr(anomalies.len()))
        }
    };

    Ok(SideStatistic {
        value,
        error,
        years,
        nonlinearity: None,
    })
}
