//! Time-series preprocessing: trend removal, anomalies and seasonal means.

use enso_metrics_core::traits::KernelResult;
use enso_metrics_core::types::{Detrending, Frequency, Season, TimeSeries};
use enso_metrics_core::CollaboratorError;

/// Subtract the least-squares line through the series.
///
/// Time is measured in steps, so the fitted slope is per step. `Detrending::None`
/// returns an unchanged copy.
pub fn detrend(series: &TimeSeries, method: Detrending) -> KernelResult<TimeSeries> {
    if method == Detrending::None {
        return Ok(series.clone());
    }
    let n = series.len();
    if n < 2 {
        return Err(CollaboratorError::insufficient("detrend", 2, n));
    }

    let mean_t = (n as f64 - 1.0) / 2.0;
    let mean_v = series.values.iter().sum::<f64>() / n as f64;
    let mut stt = 0.0;
    let mut stv = 0.0;
    for (i, v) in series.values.iter().enumerate() {
        let dt = i as f64 - mean_t;
        stt += dt * dt;
        stv += dt * (v - mean_v);
    }
    let slope = stv / stt;

    let mut out = series.clone();
    for (i, v) in out.values.iter_mut().enumerate() {
        *v -= mean_v + slope * (i as f64 - mean_t);
    }
    Ok(out)
}

/// Remove the mean annual cycle.
///
/// Monthly data needs at least one full year; every calendar month loses its
/// own climatological mean. Yearly data loses its overall mean.
pub fn anomalies(series: &TimeSeries) -> KernelResult<TimeSeries> {
    let n = series.len();
    let mut out = series.clone();
    match series.frequency {
        Frequency::Yearly => {
            if n == 0 {
                return Err(CollaboratorError::insufficient("anomalies", 1, 0));
            }
            let mean = series.values.iter().sum::<f64>() / n as f64;
            out.values.iter_mut().for_each(|v| *v -= mean);
        }
        Frequency::Monthly => {
            if n < 12 {
                return Err(CollaboratorError::insufficient("anomalies", 12, n));
            }
            let mut sums = [0.0f64; 12];
            let mut counts = [0usize; 12];
            for (i, v) in series.values.iter().enumerate() {
                let m = series.calendar_month(i) as usize - 1;
                sums[m] += v;
                counts[m] += 1;
            }
            for (i, v) in out.values.iter_mut().enumerate() {
                let m = series.calendar_month(i) as usize - 1;
                *v -= sums[m] / counts[m] as f64;
            }
        }
    }
    Ok(out)
}

/// Mean over each complete three-month block starting in the season's first
/// month.
pub fn seasonal_means(series: &TimeSeries, season: Season) -> KernelResult<Vec<f64>> {
    if series.frequency != Frequency::Monthly {
        return Err(CollaboratorError::shape(
            "seasonal_means",
            "seasonal means need monthly data",
        ));
    }
    let n = series.len();
    let first = (0..n.min(12)).find(|&i| series.calendar_month(i) == season.first_month());

    let means: Vec<f64> = match first {
        Some(first) => (first..n)
            .step_by(12)
            .filter(|&i| i + 3 <= n)
            .map(|i| series.values[i..i + 3].iter().sum::<f64>() / 3.0)
            .collect(),
        None => Vec::new(),
    };

    if means.is_empty() {
        return Err(CollaboratorError::insufficient(
            format!("seasonal_means ({})", season),
            3,
            n,
        ));
    }
    Ok(means)
}
