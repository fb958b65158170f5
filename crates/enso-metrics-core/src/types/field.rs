//! In-memory field representations exchanged with collaborators.
//!
//! Readers return either a regional time series (already spatially averaged
//! over the requested region) or a gridded `time x lat x lon` field. Both carry
//! their units and the date of their first sample so the engine can normalize
//! and align them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::time::{add_months, month_start, Frequency};
use crate::catalog::{Region, Sign};

/// Opaque locator for a dataset, interpreted only by the field reader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldHandle(pub String);

impl FieldHandle {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Types with a regular time axis.
pub trait TimeAxis: Sized {
    /// Date of the first sample (first day of its month).
    fn start(&self) -> NaiveDate;

    /// Number of time steps.
    fn steps(&self) -> usize;

    fn frequency(&self) -> Frequency;

    /// Copy of `len` steps beginning `offset` steps after the start.
    fn slice_steps(&self, offset: usize, len: usize) -> Self;

    /// Months between consecutive samples.
    fn step_months(&self) -> u32 {
        (12 / self.frequency().steps_per_year()) as u32
    }

    /// Date of the last sample, or `None` for an empty axis.
    fn end(&self) -> Option<NaiveDate> {
        let steps = self.steps();
        if steps == 0 {
            return None;
        }
        Some(add_months(self.start(), (steps as u32 - 1) * self.step_months()))
    }

    /// Length of the record in years.
    fn years(&self) -> f64 {
        self.steps() as f64 / self.frequency().steps_per_year() as f64
    }
}

/// Types carrying a flat buffer of physical values with units.
pub trait FieldValues: TimeAxis {
    fn values(&self) -> &[f64];

    fn values_mut(&mut self) -> &mut [f64];

    fn units(&self) -> &str;

    fn set_units(&mut self, units: String);

    /// Whether `other` shares this field's spatial layout.
    fn same_layout(&self, other: &Self) -> bool;

    fn map_values(&mut self, f: impl Fn(f64) -> f64) {
        for v in self.values_mut() {
            *v = f(*v);
        }
    }

    fn mean(&self) -> Option<f64> {
        let finite: Vec<f64> = self.values().iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        }
    }
}

/// Regional time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub start: NaiveDate,
    pub frequency: Frequency,
    pub values: Vec<f64>,
    pub units: String,
}

impl TimeSeries {
    pub fn monthly(start: NaiveDate, values: Vec<f64>, units: impl Into<String>) -> Self {
        Self {
            start: month_start(start),
            frequency: Frequency::Monthly,
            values,
            units: units.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Calendar month (1-12) of step `index`.
    pub fn calendar_month(&self, index: usize) -> u32 {
        use chrono::Datelike;
        let offset = index as u32 * self.step_months();
        (self.start.month0() + offset) % 12 + 1
    }
}

impl TimeAxis for TimeSeries {
    fn start(&self) -> NaiveDate {
        self.start
    }

    fn steps(&self) -> usize {
        self.values.len()
    }

    fn frequency(&self) -> Frequency {
        self.frequency
    }

    fn slice_steps(&self, offset: usize, len: usize) -> Self {
        let end = (offset + len).min(self.values.len());
        let offset = offset.min(end);
        Self {
            start: add_months(self.start, offset as u32 * self.step_months()),
            frequency: self.frequency,
            values: self.values[offset..end].to_vec(),
            units: self.units.clone(),
        }
    }
}

impl FieldValues for TimeSeries {
    fn values(&self) -> &[f64] {
        &self.values
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    fn units(&self) -> &str {
        &self.units
    }

    fn set_units(&mut self, units: String) {
        self.units = units;
    }

    fn same_layout(&self, _other: &Self) -> bool {
        true
    }
}

/// Latitude and longitude cell centres of a regular grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
}

impl GridAxes {
    pub fn new(lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Self { lat, lon }
    }

    /// Uniform grid covering `region` with cell centres every `dlat` x `dlon` degrees.
    pub fn uniform(region: &Region, dlat: f64, dlon: f64) -> Self {
        Self {
            lat: centres(region.latitude.0, region.latitude.1, dlat),
            lon: centres(region.longitude.0, region.longitude.1, dlon),
        }
    }

    pub fn cells(&self) -> usize {
        self.lat.len() * self.lon.len()
    }
}

fn centres(lower: f64, upper: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || upper <= lower {
        return Vec::new();
    }
    let n = ((upper - lower) / step).floor() as usize;
    (0..n).map(|i| lower + step * (i as f64 + 0.5)).collect()
}

/// Single 2-D slice on a regular grid, stored latitude-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2D {
    pub axes: GridAxes,
    pub values: Vec<f64>,
}

impl Grid2D {
    pub fn new(axes: GridAxes, values: Vec<f64>) -> Self {
        Self { axes, values }
    }

    pub fn get(&self, lat_idx: usize, lon_idx: usize) -> f64 {
        self.values[lat_idx * self.axes.lon.len() + lon_idx]
    }

    pub fn is_consistent(&self) -> bool {
        self.values.len() == self.axes.cells()
    }
}

/// Gridded `time x lat x lon` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedField {
    pub start: NaiveDate,
    pub frequency: Frequency,
    pub axes: GridAxes,
    /// Row-major `time x lat x lon` values.
    pub data: Vec<f64>,
    pub units: String,
}

impl GriddedField {
    pub fn monthly(start: NaiveDate, axes: GridAxes, data: Vec<f64>, units: impl Into<String>) -> Self {
        Self {
            start: month_start(start),
            frequency: Frequency::Monthly,
            axes,
            data,
            units: units.into(),
        }
    }

    /// Values of time step `t`.
    pub fn frame(&self, t: usize) -> &[f64] {
        let cells = self.axes.cells();
        &self.data[t * cells..(t + 1) * cells]
    }

    pub fn is_consistent(&self) -> bool {
        let cells = self.axes.cells();
        cells > 0 && self.data.len() % cells == 0
    }
}

impl TimeAxis for GriddedField {
    fn start(&self) -> NaiveDate {
        self.start
    }

    fn steps(&self) -> usize {
        match self.axes.cells() {
            0 => 0,
            cells => self.data.len() / cells,
        }
    }

    fn frequency(&self) -> Frequency {
        self.frequency
    }

    fn slice_steps(&self, offset: usize, len: usize) -> Self {
        let cells = self.axes.cells();
        let end = (offset + len).min(self.steps());
        let offset = offset.min(end);
        Self {
            start: add_months(self.start, offset as u32 * self.step_months()),
            frequency: self.frequency,
            axes: self.axes.clone(),
            data: self.data[offset * cells..end * cells].to_vec(),
            units: self.units.clone(),
        }
    }
}

impl FieldValues for GriddedField {
    fn values(&self) -> &[f64] {
        &self.data
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    fn units(&self) -> &str {
        &self.units
    }

    fn set_units(&mut self, units: String) {
        self.units = units;
    }

    fn same_layout(&self, other: &Self) -> bool {
        self.axes == other.axes
    }
}

/// Sum of signed terms sharing one time axis and layout.
///
/// Returns a description of the first mismatch when terms disagree on start
/// date, length or grid.
pub fn signed_sum<T: FieldValues + Clone>(terms: &[(T, Sign)]) -> Result<T, String> {
    let Some(((first, first_sign), rest)) = terms.split_first() else {
        return Err("no terms to combine".to_string());
    };

    let mut total = first.clone();
    total.map_values(|v| first_sign.apply(v));

    for (term, sign) in rest {
        if term.start() != total.start() || term.steps() != total.steps() {
            return Err(format!(
                "term starting {} with {} steps does not match {} with {} steps",
                term.start(),
                term.steps(),
                total.start(),
                total.steps()
            ));
        }
        if !term.same_layout(&total) {
            return Err("terms are on different grids".to_string());
        }
        for (acc, v) in total.values_mut().iter_mut().zip(term.values()) {
            *acc += sign.apply(*v);
        }
    }
    Ok(total)
}
