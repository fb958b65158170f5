//! Time-axis restriction and alignment.

use enso_metrics_core::types::time::months_between;
use enso_metrics_core::types::{TimeAxis, TimeWindow};
use enso_metrics_core::{MetricsError, MetricsResult};

/// Step index of the first sample at or after `months` months past the start.
fn step_at(data: &impl TimeAxis, months: i64) -> i64 {
    let step = data.step_months() as i64;
    (months + step - 1).div_euclid(step)
}

/// Keep the samples dated inside `window`.
pub fn restrict<T: TimeAxis>(data: &T, window: &TimeWindow) -> T {
    let steps = data.steps() as i64;
    let first = step_at(data, months_between(data.start(), window.start)).clamp(0, steps);
    let last = (months_between(data.start(), window.end).div_euclid(data.step_months() as i64) + 1)
        .clamp(first, steps);
    data.slice_steps(first as usize, (last - first) as usize)
}

/// Trim two series to their common period.
///
/// Fails when the sampling frequencies differ or the periods do not overlap.
pub fn align_pair<T: TimeAxis>(metric: &str, a: &T, b: &T) -> MetricsResult<(T, T)> {
    if a.frequency() != b.frequency() {
        return Err(MetricsError::alignment(
            metric,
            format!("sampling frequencies differ ({:?} vs {:?})", a.frequency(), b.frequency()),
        ));
    }
    let (Some(a_end), Some(b_end)) = (a.end(), b.end()) else {
        return Err(MetricsError::alignment(metric, "a series has no time steps"));
    };

    let start = a.start().max(b.start());
    let end = a_end.min(b_end);
    if start > end {
        return Err(MetricsError::alignment(
            metric,
            format!(
                "no overlapping time steps ({}..{} vs {}..{})",
                a.start(),
                a_end,
                b.start(),
                b_end
            ),
        ));
    }

    let window = TimeWindow::new(start, end);
    Ok((restrict(a, &window), restrict(b, &window)))
}

/// Fail unless `data` has at least `min_steps` samples.
pub fn require_steps<T: TimeAxis>(metric: &str, what: &str, data: &T, min_steps: usize) -> MetricsResult<()> {
    if data.steps() < min_steps {
        return Err(MetricsError::alignment(
            metric,
            format!("{} has {} time steps, at least {} required", what, data.steps(), min_steps),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use enso_metrics_core::types::TimeSeries;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ramp(start: NaiveDate, n: usize) -> TimeSeries {
        TimeSeries::monthly(start, (0..n).map(|i| i as f64).collect(), "C")
    }

    #[test]
    fn test_restrict_inside_window() {
        let s = ramp(ymd(1979, 1, 1), 48);
        let out = restrict(&s, &TimeWindow::new(ymd(1980, 1, 1), ymd(1980, 12, 31)));
        assert_eq!(out.start, ymd(1980, 1, 1));
        assert_eq!(out.values.first(), Some(&12.0));
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_restrict_window_wider_than_data() {
        let s = ramp(ymd(1979, 1, 1), 24);
        let out = restrict(&s, &TimeWindow::new(ymd(1850, 1, 1), ymd(2015, 12, 31)));
        assert_eq!(out, s);
    }

    #[test]
    fn test_restrict_disjoint_window_is_empty() {
        let s = ramp(ymd(1979, 1, 1), 24);
        let out = restrict(&s, &TimeWindow::new(ymd(1900, 1, 1), ymd(1910, 12, 31)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_align_pair_common_overlap() {
        let a = ramp(ymd(1979, 1, 1), 36);
        let b = ramp(ymd(1980, 6, 1), 36);
        let (a2, b2) = align_pair("EnsoFbSstThf", &a, &b).unwrap();
        assert_eq!(a2.start, ymd(1980, 6, 1));
        assert_eq!(b2.start, ymd(1980, 6, 1));
        assert_eq!(a2.len(), 19);
        assert_eq!(b2.len(), 19);
        assert_eq!(a2.values[0], 17.0);
        assert_eq!(b2.values[0], 0.0);
    }

    #[test]
    fn test_align_pair_no_overlap() {
        let a = ramp(ymd(1950, 1, 1), 12);
        let b = ramp(ymd(1990, 1, 1), 12);
        let err = align_pair("EnsoFbSstThf", &a, &b).unwrap_err();
        assert!(err.is_alignment());
        assert!(err.to_string().contains("no overlapping"));
    }

    #[test]
    fn test_require_steps() {
        let s = ramp(ymd(1979, 1, 1), 10);
        assert!(require_steps("EnsoAmpl", "model sst", &s, 10).is_ok());
        let err = require_steps("EnsoAmpl", "model sst", &s, 12).unwrap_err();
        assert!(err.is_alignment());
        assert!(err.to_string().contains("10 time steps"));
    }
}
