//! Moments of a sample.

use enso_metrics_core::traits::KernelResult;
use enso_metrics_core::CollaboratorError;

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with an n - 1 denominator.
pub fn std_dev(values: &[f64]) -> KernelResult<f64> {
    let n = values.len();
    if n < 2 {
        return Err(CollaboratorError::insufficient("std_dev", 2, n));
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / (n as f64 - 1.0)).sqrt())
}

/// Moment coefficient of skewness, `m3 / m2^1.5`, without small-sample
/// correction.
pub fn skewness(values: &[f64]) -> KernelResult<f64> {
    let n = values.len();
    if n < 3 {
        return Err(CollaboratorError::insufficient("skewness", 3, n));
    }
    let m = mean(values);
    let nf = n as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return Err(CollaboratorError::Other(
            "skewness of a constant sample is undefined".to_string(),
        ));
    }
    Ok(m3 / m2.powf(1.5))
}

/// Standard error of the sample skewness for `n` samples.
pub fn skewness_stderr(n: usize) -> f64 {
    let n = n as f64;
    (6.0 * n * (n - 1.0) / ((n - 2.0) * (n + 1.0) * (n + 3.0))).sqrt()
}
