//! Storage access.

use crate::catalog::Region;
use crate::error::CollaboratorError;
use crate::types::{FieldHandle, GriddedField, TimeSeries};

/// Reads native fields from the dataset behind a [`FieldHandle`].
///
/// `field` is a primitive native name produced by composite expansion, never
/// a canonical variable id. Implementations apply the region's box and
/// land/ocean masks; unit conversion is left to the engine.
pub trait FieldReader: Send + Sync {
    /// Area-averaged time series over `region`.
    fn read_series(
        &self,
        handle: &FieldHandle,
        field: &str,
        region: &Region,
    ) -> Result<TimeSeries, CollaboratorError>;

    /// Gridded `time x lat x lon` field cropped to `region`.
    fn read_field(
        &self,
        handle: &FieldHandle,
        field: &str,
        region: &Region,
    ) -> Result<GriddedField, CollaboratorError>;
}
