//! Spatial reductions of gridded fields.

use enso_metrics_core::traits::{KernelResult, Profile, ProfileAxis};
use enso_metrics_core::types::{Grid2D, GriddedField, TimeAxis};
use enso_metrics_core::CollaboratorError;

/// Cosine-of-latitude weight for each latitude, or ones.
pub fn latitude_weights(lat: &[f64], area_weighted: bool) -> Vec<f64> {
    lat.iter()
        .map(|l| if area_weighted { l.to_radians().cos().max(0.0) } else { 1.0 })
        .collect()
}

/// Mean over time of every grid cell. Cells with no finite sample are NaN.
pub fn time_mean(field: &GriddedField) -> KernelResult<Grid2D> {
    if !field.is_consistent() {
        return Err(CollaboratorError::shape(
            "time_mean",
            format!("{} values do not fill a {}-cell grid", field.data.len(), field.axes.cells()),
        ));
    }
    let steps = field.steps();
    if steps == 0 {
        return Err(CollaboratorError::insufficient("time_mean", 1, 0));
    }

    let cells = field.axes.cells();
    let mut sums = vec![0.0; cells];
    let mut counts = vec![0usize; cells];
    for t in 0..steps {
        for (c, v) in field.frame(t).iter().enumerate() {
            if v.is_finite() {
                sums[c] += v;
                counts[c] += 1;
            }
        }
    }
    let values = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| if n == 0 { f64::NAN } else { s / n as f64 })
        .collect();
    Ok(Grid2D::new(field.axes.clone(), values))
}

/// Collapse a map onto longitude (meridional mean) or latitude (zonal mean).
pub fn profile(grid: &Grid2D, axis: ProfileAxis, area_weighted: bool) -> KernelResult<Profile> {
    if !grid.is_consistent() || grid.axes.cells() == 0 {
        return Err(CollaboratorError::shape(
            "profile",
            format!("{} values on a {}-cell grid", grid.values.len(), grid.axes.cells()),
        ));
    }
    let lat_w = latitude_weights(&grid.axes.lat, area_weighted);
    let nlat = grid.axes.lat.len();
    let nlon = grid.axes.lon.len();

    let profile = match axis {
        ProfileAxis::Longitude => Profile {
            axis,
            coords: grid.axes.lon.clone(),
            values: (0..nlon)
                .map(|j| weighted_mean((0..nlat).map(|i| (grid.get(i, j), lat_w[i]))))
                .collect(),
            weights: vec![1.0; nlon],
        },
        ProfileAxis::Latitude => Profile {
            axis,
            coords: grid.axes.lat.clone(),
            values: (0..nlat)
                .map(|i| weighted_mean((0..nlon).map(|j| (grid.get(i, j), 1.0))))
                .collect(),
            weights: lat_w,
        },
    };
    Ok(profile)
}

fn weighted_mean(cells: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (mut sum, mut wsum) = (0.0, 0.0);
    for (v, w) in cells {
        if v.is_finite() {
            sum += v * w;
            wsum += w;
        }
    }
    if wsum > 0.0 {
        sum / wsum
    } else {
        f64::NAN
    }
}

/// Weighted root-mean-square difference over pairs where both sides are
/// finite.
pub fn rmse(
    model: &[f64],
    observations: &[f64],
    weights: Option<&[f64]>,
    centered: bool,
) -> KernelResult<f64> {
    if model.len() != observations.len() {
        return Err(CollaboratorError::shape(
            "rmse",
            format!("{} model vs {} observed points", model.len(), observations.len()),
        ));
    }
    if let Some(w) = weights {
        if w.len() != model.len() {
            return Err(CollaboratorError::shape(
                "rmse",
                format!("{} weights for {} points", w.len(), model.len()),
            ));
        }
    }

    let triples: Vec<(f64, f64, f64)> = model
        .iter()
        .zip(observations)
        .enumerate()
        .filter(|(_, (m, o))| m.is_finite() && o.is_finite())
        .map(|(i, (m, o))| (*m, *o, weights.map_or(1.0, |w| w[i])))
        .collect();
    let wsum: f64 = triples.iter().map(|(_, _, w)| w).sum();
    if triples.is_empty() || wsum <= 0.0 {
        return Err(CollaboratorError::insufficient("rmse", 1, 0));
    }

    let (offset_m, offset_o) = if centered {
        (
            triples.iter().map(|(m, _, w)| m * w).sum::<f64>() / wsum,
            triples.iter().map(|(_, o, w)| o * w).sum::<f64>() / wsum,
        )
    } else {
        (0.0, 0.0)
    };

    let mse = triples
        .iter()
        .map(|(m, o, w)| {
            let d = (m - offset_m) - (o - offset_o);
            w * d * d
        })
        .sum::<f64>()
        / wsum;
    Ok(mse.sqrt())
}
