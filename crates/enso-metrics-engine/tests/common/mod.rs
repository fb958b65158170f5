//! Shared fixtures: a small hand-written registry and synthetic data.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use enso_metrics_core::stubs::InMemoryFieldReader;
use enso_metrics_core::types::{GridAxes, GriddedField};
use enso_metrics_core::{MetricRegistry, TableSources, TimeSeries};
use enso_metrics_engine::{ComputeRequest, MetricEngine};

pub const REGIONS: &str = r#"
[regions.nino3]
long_name = "Niño 3"
latitude = [-5.0, 5.0]
longitude = [210.0, 270.0]

[regions.nino4]
long_name = "Niño 4"
latitude = [-5.0, 5.0]
longitude = [160.0, 210.0]

[regions.equatorial_pacific]
long_name = "Equatorial Pacific"
latitude = [-5.0, 5.0]
longitude = [150.0, 270.0]

[regions.eastern_pacific]
long_name = "Eastern equatorial Pacific"
latitude = [-5.0, 5.0]
longitude = [240.0, 270.0]

[regions.greenwich]
long_name = "Box across the prime meridian"
latitude = [-5.0, 5.0]
longitude = [350.0, 400.0]
"#;

pub const VARIABLES: &str = r#"
[variables.sst]
long_name = "sea surface temperature"
cf_names = ["sea_surface_temperature"]
units = "K"
kind = "temperature"
source = "ts"

[variables.taux]
long_name = "zonal wind stress"
cf_names = ["surface_downward_eastward_stress"]
units = "N m-2"
kind = "wind_stress"
source = "tauu"

[variables.lwr]
long_name = "net longwave radiation"
cf_names = ["surface_downwelling_longwave_flux_in_air", "surface_upwelling_longwave_flux_in_air"]
units = "W m-2"
kind = "heat_flux"
source = [{ term = "rlds", sign = "add" }, { term = "rlus", sign = "subtract" }]
"#;

pub const OBSERVATIONS: &str = r#"
[datasets.RefA]
[datasets.RefA.variables]
sst = "sst"
taux = "taux"

[datasets.RefB]
[datasets.RefB.variables]
sst = "ts"
taux = "tauu"
lwr = [{ term = "rlds", sign = "add" }, { term = "rlus", sign = "subtract" }]
"#;

pub const COLLECTIONS: &str = r#"
[collections.test]
long_name = "Test collection"
description = "Synthetic checks of every metric category"
plot_order = ["EnsoAmpl", "EnsoFbSstTaux", "BiasSstLonRmse"]

[collections.test.common]
detrending = "none"
frequency = "monthly"
min_time_steps = 24
normalization = false
project_interpreter = "CMIP"
observed_period = { start = "1900-01-01", end = "2099-12-31" }
modeled_period = { start = "1900-01-01", end = "2099-12-31" }

[[collections.test.metrics]]
id = "EnsoAmpl"
variables = [{ variable = "sst", region = "nino3", observations = ["RefA", "RefB"] }]

[[collections.test.metrics]]
id = "EnsoSstSkew"
variables = [{ variable = "sst", region = "nino3", observations = ["RefA"] }]

[[collections.test.metrics]]
id = "EnsoFbSstTaux"
variables = [
    { variable = "sst", region = "nino3", observations = ["RefA", "RefB"] },
    { variable = "taux", region = "nino4", observations = ["RefA", "RefB"] },
]

[[collections.test.metrics]]
id = "EnsoFbSstLwr"
variables = [
    { variable = "sst", region = "nino3", observations = ["RefA"] },
    { variable = "lwr", region = "nino3", observations = ["RefB"] },
]
metric_computation = "abs_relative_difference"

[[collections.test.metrics]]
id = "BiasSstLonRmse"
variables = [{ variable = "sst", region = "equatorial_pacific", observations = ["RefA"] }]
regridding = { sides = "both", regridder = "cdms", tool = "esmf", method = "linear", target_grid = "generic_1x1deg" }

[[collections.test.metrics]]
id = "BiasTauxLonRmse"
variables = [{ variable = "taux", region = "equatorial_pacific", observations = ["RefA"] }]

[[collections.test.metrics]]
id = "EnsoDuration"
variables = [{ variable = "sst", region = "nino3", observations = ["RefA"] }]
"#;

pub fn registry() -> Arc<MetricRegistry> {
    let sources = TableSources {
        regions: REGIONS,
        variables: VARIABLES,
        observations: OBSERVATIONS,
        collections: COLLECTIONS,
    };
    Arc::new(MetricRegistry::from_sources(&sources).expect("test tables must validate"))
}

pub fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

/// Irregular monthly anomaly pattern, `years` long.
pub fn pattern(years: usize) -> Vec<f64> {
    (0..years * 12)
        .map(|i| {
            let t = i as f64;
            (t * 0.29).sin() + 0.6 * (t * 0.071).cos() + 0.2 * (t * 1.3).sin()
        })
        .collect()
}

/// `base + scale * pattern`.
pub fn series(start: i32, years: usize, base: f64, scale: f64, units: &str) -> TimeSeries {
    let values = pattern(years).into_iter().map(|v| base + scale * v).collect();
    TimeSeries::monthly(date(start), values, units)
}

/// Independent anomaly flipping sign every year with a growing amplitude.
///
/// Every calendar month sums to exactly zero over each pair of years, so the
/// series is its own anomaly. `years` must be even.
pub fn alternating(start: i32, years: usize, units: &str) -> TimeSeries {
    let values = (0..years * 12)
        .map(|i| {
            let year = i / 12;
            let g = 1.0 + 0.5 * (year / 2) as f64;
            if year % 2 == 0 {
                g
            } else {
                -g
            }
        })
        .collect();
    TimeSeries::monthly(date(start), values, units)
}

/// `positive * x` where `x >= 0`, `negative * x` elsewhere.
pub fn piecewise(x: &TimeSeries, positive: f64, negative: f64, units: &str) -> TimeSeries {
    let values = x
        .values
        .iter()
        .map(|&v| if v >= 0.0 { positive * v } else { negative * v })
        .collect();
    TimeSeries::monthly(x.start, values, units)
}

/// Spatially uniform field following `pattern` in time.
pub fn uniform_field(start: i32, years: usize, axes: GridAxes, base: f64, units: &str) -> GriddedField {
    let cells = axes.cells();
    let data = pattern(years)
        .into_iter()
        .flat_map(|v| std::iter::repeat(base + v).take(cells))
        .collect();
    GriddedField::monthly(date(start), axes, data, units)
}

/// Field varying with longitude only, constant in time.
pub fn zonal_gradient(start: i32, years: usize, axes: GridAxes, base: f64, slope: f64, units: &str) -> GriddedField {
    let frame: Vec<f64> = axes
        .lat
        .iter()
        .flat_map(|_| axes.lon.iter().map(move |lon| base + slope * (lon - 150.0)))
        .collect();
    let data = (0..years * 12).flat_map(|_| frame.iter().copied()).collect();
    GriddedField::monthly(date(start), axes, data, units)
}

pub fn axes(lat: &[f64], lon_start: f64, lon_step: f64, lon_count: usize) -> GridAxes {
    GridAxes::new(
        lat.to_vec(),
        (0..lon_count).map(|i| lon_start + lon_step * i as f64).collect(),
    )
}

/// Reference-side data for every metric of the test collection.
///
/// Model data is the reference scaled by `model_scale` around the same mean,
/// so every self statistic ratio equals `model_scale` (skewness: 1).
pub fn full_reader(model_scale: f64) -> InMemoryFieldReader {
    let years = 10;
    let x = alternating(1960, years, "degC");
    let bump: Vec<f64> = pattern(years).into_iter().map(|p| 0.05 * p * p).collect();
    let sst = |scale: f64| {
        let values = x.values.iter().zip(&bump).map(|(v, b)| scale * (v + b)).collect();
        TimeSeries::monthly(x.start, values, "degC")
    };
    let lwr = piecewise(&x, -10.0, -15.0, "W m-2");
    let rlus = TimeSeries::monthly(x.start, vec![400.0; x.values.len()], "W m-2");
    let rlds = TimeSeries::monthly(
        x.start,
        lwr.values.iter().map(|v| v + 400.0).collect(),
        "W m-2",
    );

    let map = axes(&[-4.0, -2.0, 0.0, 2.0, 4.0], 150.0, 10.0, 13);
    InMemoryFieldReader::new()
        .with_series("model.nc", "ts", sst(model_scale))
        .with_series("model.nc", "tauu", piecewise(&x, 0.015, 0.02, "N m-2"))
        .with_series("model.nc", "rlds", rlds.clone())
        .with_series("model.nc", "rlus", rlus.clone())
        .with_field("model.nc", "ts", uniform_field(1960, years, map.clone(), 300.65, "K"))
        .with_field("model.nc", "tauu", zonal_gradient(1960, years, map.clone(), 0.01, 1e-4, "N m-2"))
        .with_series("refa.nc", "sst", sst(1.0))
        .with_series("refa.nc", "taux", piecewise(&x, 0.01, 0.015, "Pa"))
        .with_field("refa.nc", "sst", uniform_field(1960, years, map.clone(), 27.0, "degC"))
        .with_field("refa.nc", "taux", zonal_gradient(1960, years, map, 0.0, 1e-4, "Pa"))
        .with_series("refb.nc", "rlds", rlds)
        .with_series("refb.nc", "rlus", rlus)
}

/// Request template naming every handle `full_reader` serves.
pub fn full_template(metric: &str) -> ComputeRequest {
    ComputeRequest::new("test", metric, "synthetic-model")
        .with_model_handle("sst", "model.nc")
        .with_model_handle("taux", "model.nc")
        .with_model_handle("lwr", "model.nc")
        .with_observation_handle("RefA", "refa.nc")
        .with_observation_handle("RefB", "refb.nc")
}

pub fn engine(reader: InMemoryFieldReader) -> MetricEngine {
    MetricEngine::new(registry(), Arc::new(reader))
}
