//! Grid conformance.

use crate::collection::InterpolationMethod;
use crate::error::CollaboratorError;
use crate::types::{Grid2D, GridAxes};

/// Interpolates a 2-D field onto target axes.
pub trait GridConformer: Send + Sync {
    fn regrid(
        &self,
        grid: &Grid2D,
        target: &GridAxes,
        method: InterpolationMethod,
    ) -> Result<Grid2D, CollaboratorError>;
}
