//! In-memory [`FieldReader`] keyed by `(handle, native field)`.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::catalog::Region;
use crate::error::CollaboratorError;
use crate::traits::FieldReader;
use crate::types::{FieldHandle, GridAxes, GriddedField, TimeAxis, TimeSeries};

/// Which reader method served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Series,
    Field,
}

/// One recorded read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub kind: ReadKind,
    pub handle: String,
    pub field: String,
    pub region: String,
}

/// Reader over preloaded data.
///
/// Series are returned as stored regardless of region. Gridded fields are
/// cropped to the region's box, so region overrides change what a compare
/// metric sees.
#[derive(Debug, Default)]
pub struct InMemoryFieldReader {
    series: HashMap<(String, String), TimeSeries>,
    fields: HashMap<(String, String), GriddedField>,
    requests: Mutex<Vec<ReadRequest>>,
}

impl InMemoryFieldReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, handle: &str, field: &str, series: TimeSeries) -> Self {
        self.insert_series(handle, field, series);
        self
    }

    pub fn with_field(mut self, handle: &str, field: &str, data: GriddedField) -> Self {
        self.insert_field(handle, field, data);
        self
    }

    pub fn insert_series(&mut self, handle: &str, field: &str, series: TimeSeries) {
        self.series
            .insert((handle.to_string(), field.to_string()), series);
    }

    pub fn insert_field(&mut self, handle: &str, field: &str, data: GriddedField) {
        self.fields.insert((handle.to_string(), field.to_string()), data);
    }

    /// Every request served so far, in arrival order.
    pub fn requests(&self) -> Vec<ReadRequest> {
        self.requests.lock().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    fn record(&self, kind: ReadKind, handle: &FieldHandle, field: &str, region: &Region) {
        self.requests.lock().push(ReadRequest {
            kind,
            handle: handle.to_string(),
            field: field.to_string(),
            region: region.id.clone(),
        });
    }

    fn not_found(handle: &FieldHandle, field: &str) -> CollaboratorError {
        CollaboratorError::FieldNotFound {
            handle: handle.to_string(),
            field: field.to_string(),
        }
    }
}

impl FieldReader for InMemoryFieldReader {
    fn read_series(
        &self,
        handle: &FieldHandle,
        field: &str,
        region: &Region,
    ) -> Result<TimeSeries, CollaboratorError> {
        self.record(ReadKind::Series, handle, field, region);
        self.series
            .get(&(handle.to_string(), field.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(handle, field))
    }

    fn read_field(
        &self,
        handle: &FieldHandle,
        field: &str,
        region: &Region,
    ) -> Result<GriddedField, CollaboratorError> {
        self.record(ReadKind::Field, handle, field, region);
        let stored = self
            .fields
            .get(&(handle.to_string(), field.to_string()))
            .ok_or_else(|| Self::not_found(handle, field))?;
        crop(stored, region)
    }
}

fn crop(field: &GriddedField, region: &Region) -> Result<GriddedField, CollaboratorError> {
    let lat_idx: Vec<usize> = field
        .axes
        .lat
        .iter()
        .enumerate()
        .filter(|(_, lat)| **lat >= region.latitude.0 && **lat <= region.latitude.1)
        .map(|(i, _)| i)
        .collect();
    let mid_lat = (region.latitude.0 + region.latitude.1) / 2.0;
    let lon_idx: Vec<usize> = field
        .axes
        .lon
        .iter()
        .enumerate()
        .filter(|(_, lon)| region.contains(mid_lat, **lon))
        .map(|(i, _)| i)
        .collect();

    if lat_idx.is_empty() || lon_idx.is_empty() {
        return Err(CollaboratorError::shape(
            "crop",
            format!("no grid points inside region '{}'", region.id),
        ));
    }

    let axes = GridAxes::new(
        lat_idx.iter().map(|&i| field.axes.lat[i]).collect(),
        lon_idx.iter().map(|&j| field.axes.lon[j]).collect(),
    );
    let nlon = field.axes.lon.len();
    let mut data = Vec::with_capacity(field.steps() * axes.cells());
    for t in 0..field.steps() {
        let frame = field.frame(t);
        for &i in &lat_idx {
            for &j in &lon_idx {
                data.push(frame[i * nlon + j]);
            }
        }
    }

    Ok(GriddedField {
        start: field.start,
        frequency: field.frequency,
        axes,
        data,
        units: field.units.clone(),
    })
}
