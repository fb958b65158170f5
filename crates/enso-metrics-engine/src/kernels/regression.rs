//! Ordinary least squares on sign-partitioned samples.

use enso_metrics_core::traits::{KernelResult, RegressionFit, SignPartition};
use enso_metrics_core::CollaboratorError;

/// Regress `dependent` on `independent` using the pairs whose independent
/// value falls in `partition`.
///
/// ```text
/// slope  = Sxy / Sxx
/// stderr = sqrt(SSE / (n - 2) / Sxx)
/// ```
pub fn regression(
    independent: &[f64],
    dependent: &[f64],
    partition: SignPartition,
) -> KernelResult<RegressionFit> {
    if independent.len() != dependent.len() {
        return Err(CollaboratorError::shape(
            "regression",
            format!("{} independent vs {} dependent samples", independent.len(), dependent.len()),
        ));
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = independent
        .iter()
        .zip(dependent)
        .filter(|(x, y)| x.is_finite() && y.is_finite() && partition.includes(**x))
        .map(|(x, y)| (*x, *y))
        .unzip();

    let n = xs.len();
    if n < 3 {
        return Err(CollaboratorError::insufficient(
            format!("regression ({:?})", partition),
            3,
            n,
        ));
    }

    let mx = super::moments::mean(&xs);
    let my = super::moments::mean(&ys);
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        sxx += (x - mx) * (x - mx);
        sxy += (x - mx) * (y - my);
    }
    if sxx == 0.0 {
        return Err(CollaboratorError::Other(format!(
            "independent values are constant in {:?} partition",
            partition
        )));
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let sse: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| {
            let r = y - (intercept + slope * x);
            r * r
        })
        .sum();

    Ok(RegressionFit {
        slope,
        stderr: (sse / (n as f64 - 2.0) / sxx).sqrt(),
        samples: n,
    })
}
