//! Axis-aligned regridding between regular latitude/longitude grids.

use enso_metrics_core::collection::InterpolationMethod;
use enso_metrics_core::traits::GridConformer;
use enso_metrics_core::types::{Grid2D, GridAxes};
use enso_metrics_core::CollaboratorError;

const FULL_CIRCLE: f64 = 360.0;
const SEAM_TOLERANCE: f64 = 1e-9;

/// Interpolates separably along latitude then longitude.
///
/// Longitudes are periodic: targets are read modulo 360 in the source's
/// convention, so a 350..400 target samples a 0..360 source on both sides of
/// the meridian. A source that closes the circle is interpolated across the
/// seam. Other targets outside the source axes take the nearest edge value.
/// Source axes must be strictly increasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisRegridder;

impl AxisRegridder {
    pub fn new() -> Self {
        Self
    }
}

impl GridConformer for AxisRegridder {
    fn regrid(
        &self,
        grid: &Grid2D,
        target: &GridAxes,
        method: InterpolationMethod,
    ) -> Result<Grid2D, CollaboratorError> {
        if !grid.is_consistent() || grid.axes.cells() == 0 {
            return Err(CollaboratorError::shape(
                "regrid",
                format!("{} values on a {}-cell source grid", grid.values.len(), grid.axes.cells()),
            ));
        }
        if !is_increasing(&grid.axes.lat) || !is_increasing(&grid.axes.lon) {
            return Err(CollaboratorError::shape("regrid", "source axes must be strictly increasing"));
        }
        if target.cells() == 0 {
            return Err(CollaboratorError::shape("regrid", "target grid is empty"));
        }

        let lat_w: Vec<Stencil> = target.lat.iter().map(|&y| stencil(&grid.axes.lat, y, method)).collect();
        let lon_w: Vec<Stencil> = target.lon.iter().map(|&x| lon_stencil(&grid.axes.lon, x, method)).collect();

        let mut values = Vec::with_capacity(target.cells());
        for sy in &lat_w {
            for sx in &lon_w {
                let v = sy.w0 * (sx.w0 * grid.get(sy.i0, sx.i0) + sx.w1 * grid.get(sy.i0, sx.i1))
                    + sy.w1 * (sx.w0 * grid.get(sy.i1, sx.i0) + sx.w1 * grid.get(sy.i1, sx.i1));
                values.push(v);
            }
        }
        Ok(Grid2D::new(target.clone(), values))
    }
}

/// Two source indices and their weights for one target coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stencil {
    i0: usize,
    i1: usize,
    w0: f64,
    w1: f64,
}

impl Stencil {
    fn single(i: usize) -> Self {
        Self { i0: i, i1: i, w0: 1.0, w1: 0.0 }
    }

    fn between(i0: usize, i1: usize, frac: f64, method: InterpolationMethod) -> Self {
        match method {
            InterpolationMethod::Linear => Self { i0, i1, w0: 1.0 - frac, w1: frac },
            InterpolationMethod::Nearest => Self::single(if frac <= 0.5 { i0 } else { i1 }),
        }
    }
}

fn stencil(axis: &[f64], x: f64, method: InterpolationMethod) -> Stencil {
    let last = axis.len() - 1;
    if x <= axis[0] {
        return Stencil::single(0);
    }
    if x >= axis[last] {
        return Stencil::single(last);
    }
    let i1 = axis.partition_point(|&a| a <= x);
    let i0 = i1 - 1;
    let frac = (x - axis[i0]) / (axis[i1] - axis[i0]);
    Stencil::between(i0, i1, frac, method)
}

fn lon_stencil(axis: &[f64], x: f64, method: InterpolationMethod) -> Stencil {
    let last = axis.len() - 1;
    let first_lon = axis[0];
    let last_lon = axis[last];
    let x = first_lon + (x - first_lon).rem_euclid(FULL_CIRCLE);
    if x <= last_lon {
        return stencil(axis, x, method);
    }

    // between the last column and the first one, one turn later
    let seam = first_lon + FULL_CIRCLE - last_lon;
    if last > 0 && seam <= max_spacing(axis) + SEAM_TOLERANCE {
        return Stencil::between(last, 0, (x - last_lon) / seam, method);
    }
    if x - last_lon <= first_lon + FULL_CIRCLE - x {
        Stencil::single(last)
    } else {
        Stencil::single(0)
    }
}

fn max_spacing(axis: &[f64]) -> f64 {
    axis.windows(2).map(|w| w[1] - w[0]).fold(0.0, f64::max)
}

fn is_increasing(axis: &[f64]) -> bool {
    axis.windows(2).all(|w| w[0] < w[1])
}

/// Cell size in degrees encoded in a target grid name such as
/// `generic_1x1deg` or `generic_2.5x2.5deg`, as `(dlat, dlon)`.
pub fn parse_target_grid(name: &str) -> Option<(f64, f64)> {
    let spec = name.strip_prefix("generic_")?.strip_suffix("deg")?;
    let (dlat, dlon) = spec.split_once('x')?;
    let dlat: f64 = dlat.parse().ok()?;
    let dlon: f64 = dlon.parse().ok()?;
    (dlat > 0.0 && dlon > 0.0).then_some((dlat, dlon))
}
