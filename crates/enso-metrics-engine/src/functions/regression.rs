//! Two-field regression with a nonlinearity channel.

use enso_metrics_core::traits::{KernelResult, SignPartition, StatisticsKernels};
use enso_metrics_core::types::{TimeAxis, TimeSeries};
use enso_metrics_core::CollaboratorError;

use super::{RegressionRoles, SideStatistic};

/// Fit `dependent` on `independent` (aligned anomaly series) three times:
/// over all samples, where the independent anomaly is positive, and where it
/// is negative.
///
/// ```text
/// value              = slope_all
/// error              = stderr_all
/// nonlinearity       = slope_neg - slope_pos
/// nonlinearity_error = stderr_neg + stderr_pos
/// ```
///
/// All four are multiplied by `roles.scale`.
pub fn regression_statistic(
    kernels: &dyn StatisticsKernels,
    roles: &RegressionRoles,
    independent: &TimeSeries,
    dependent: &TimeSeries,
) -> KernelResult<SideStatistic> {
    if independent.len() != dependent.len() || independent.start != dependent.start {
        return Err(CollaboratorError::shape(
            "regression",
            format!(
                "{} starting {} with {} steps vs {} starting {} with {} steps",
                roles.independent,
                independent.start,
                independent.len(),
                roles.dependent,
                dependent.start,
                dependent.len()
            ),
        ));
    }

    let fit = |partition| kernels.regression(&independent.values, &dependent.values, partition);
    let all = fit(SignPartition::All)?;
    let pos = fit(SignPartition::Positive)?;
    let neg = fit(SignPartition::Negative)?;

    let s = roles.scale;
    Ok(SideStatistic {
        value: all.slope * s,
        error: all.stderr * s,
        years: independent.years(),
        nonlinearity: Some(((neg.slope - pos.slope) * s, (neg.stderr + pos.stderr) * s)),
    })
}
