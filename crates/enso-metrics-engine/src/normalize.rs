//! Reduction of model and reference statistics to one comparable value.

use enso_metrics_core::collection::MetricComputation;
use enso_metrics_core::types::NonlinearityBreakdown;
use enso_metrics_core::{MetricsError, MetricsResult, NonlinearityRatio};

use crate::functions::SideStatistic;

/// A normalized value and its propagated error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub metric: f64,
    pub error: f64,
}

/// `model / obs`, with the error of a quotient:
///
/// ```text
/// error = (model * obs_err + obs * model_err) / obs^2
/// ```
pub fn ratio(
    context: &str,
    model: f64,
    model_err: f64,
    obs: f64,
    obs_err: f64,
) -> MetricsResult<Normalized> {
    if obs == 0.0 {
        return Err(MetricsError::numeric(context, "reference value is zero"));
    }
    let out = Normalized {
        metric: model / obs,
        error: (model * obs_err + obs * model_err) / (obs * obs),
    };
    if !out.metric.is_finite() || !out.error.is_finite() {
        return Err(MetricsError::numeric(
            context,
            format!("non-finite ratio {} +- {}", out.metric, out.error),
        ));
    }
    Ok(out)
}

/// Report a ratio the way the metric asks for.
pub fn apply_computation(n: Normalized, computation: MetricComputation) -> Normalized {
    match computation {
        MetricComputation::Ratio => n,
        MetricComputation::AbsRelativeDifference => Normalized {
            metric: (n.metric - 1.0).abs(),
            error: n.error,
        },
    }
}

/// Normalize the nonlinearity channel of two regression statistics.
///
/// Returns `Ok(None)` when either side has no nonlinearity channel.
pub fn nonlinearity(
    context: &str,
    model: &SideStatistic,
    obs: &SideStatistic,
    mode: NonlinearityRatio,
    computation: MetricComputation,
) -> MetricsResult<Option<NonlinearityBreakdown>> {
    let (Some((nl_model, nl_model_err)), Some((nl_obs, nl_obs_err))) =
        (model.nonlinearity, obs.nonlinearity)
    else {
        return Ok(None);
    };

    let context = format!("{} nonlinearity", context);
    let channel = ratio(&context, nl_model, nl_model_err, nl_obs, nl_obs_err)?;
    let reported = match mode {
        NonlinearityRatio::Channel => channel,
        NonlinearityRatio::PrimaryValue => {
            let primary = ratio(&context, model.value, model.error, obs.value, obs.error)?;
            Normalized {
                metric: primary.metric,
                error: channel.error,
            }
        }
    };
    let reported = apply_computation(reported, computation);

    Ok(Some(NonlinearityBreakdown {
        model: nl_model,
        model_error: nl_model_err,
        observations: nl_obs,
        observations_error: nl_obs_err,
        metric: reported.metric,
        metric_error: reported.error,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(value: f64, error: f64, nl: Option<(f64, f64)>) -> SideStatistic {
        SideStatistic {
            value,
            error,
            years: 30.0,
            nonlinearity: nl,
        }
    }

    #[test]
    fn test_ratio_propagates_error() {
        let n = ratio("EnsoAmpl", 2.0, 0.1, 1.0, 0.05).unwrap();
        assert!((n.metric - 2.0).abs() < 1e-12);
        assert!((n.error - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_zero_reference() {
        let err = ratio("EnsoAmpl", 2.0, 0.1, 0.0, 0.05).unwrap_err();
        assert!(err.is_numeric());
        assert!(err.to_string().contains("EnsoAmpl"));
    }

    #[test]
    fn test_ratio_rejects_non_finite() {
        assert!(ratio("EnsoAmpl", f64::NAN, 0.1, 1.0, 0.05).unwrap_err().is_numeric());
    }

    #[test]
    fn test_abs_relative_difference() {
        let n = apply_computation(
            Normalized { metric: 0.75, error: 0.1 },
            MetricComputation::AbsRelativeDifference,
        );
        assert!((n.metric - 0.25).abs() < 1e-12);
        assert_eq!(n.error, 0.1);
    }

    #[test]
    fn test_nonlinearity_zero_reference_channel() {
        // Model: pos 1.5, neg 2.0. Reference: pos 1.0, neg 1.0.
        let model = side(1.8, 0.1, Some((2.0 - 1.5, 0.2)));
        let obs = side(1.0, 0.1, Some((1.0 - 1.0, 0.2)));
        for mode in [NonlinearityRatio::Channel, NonlinearityRatio::PrimaryValue] {
            let err = nonlinearity("EnsoFbSstThf", &model, &obs, mode, MetricComputation::Ratio).unwrap_err();
            assert!(err.is_numeric());
        }
    }

    #[test]
    fn test_nonlinearity_modes() {
        let model = side(3.0, 0.3, Some((1.0, 0.1)));
        let obs = side(1.5, 0.15, Some((0.5, 0.05)));

        let channel = nonlinearity("m", &model, &obs, NonlinearityRatio::Channel, MetricComputation::Ratio)
            .unwrap()
            .unwrap();
        assert!((channel.metric - 2.0).abs() < 1e-12);
        // (1.0 * 0.05 + 0.5 * 0.1) / 0.25
        assert!((channel.metric_error - 0.4).abs() < 1e-12);
        assert_eq!(channel.model, 1.0);
        assert_eq!(channel.observations, 0.5);

        let primary = nonlinearity("m", &model, &obs, NonlinearityRatio::PrimaryValue, MetricComputation::Ratio)
            .unwrap()
            .unwrap();
        assert!((primary.metric - 2.0).abs() < 1e-12);
        assert!((primary.metric_error - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_nonlinearity_modes_differ_when_channels_differ() {
        let model = side(3.0, 0.3, Some((1.5, 0.1)));
        let obs = side(1.5, 0.15, Some((0.5, 0.05)));
        let channel = nonlinearity("m", &model, &obs, NonlinearityRatio::Channel, MetricComputation::Ratio)
            .unwrap()
            .unwrap();
        let primary = nonlinearity("m", &model, &obs, NonlinearityRatio::PrimaryValue, MetricComputation::Ratio)
            .unwrap()
            .unwrap();
        assert!((channel.metric - 3.0).abs() < 1e-12);
        assert!((primary.metric - 2.0).abs() < 1e-12);
        assert_eq!(channel.metric_error, primary.metric_error);
    }

    #[test]
    fn test_no_channel_without_nonlinearity() {
        let model = side(3.0, 0.3, None);
        let obs = side(1.5, 0.15, None);
        let out = nonlinearity("m", &model, &obs, NonlinearityRatio::Channel, MetricComputation::Ratio).unwrap();
        assert!(out.is_none());
    }
}
