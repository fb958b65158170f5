//! Domain types shared by the registry, the engine and its collaborators.

pub mod field;
pub mod result;
pub mod time;


pub use field::{
    signed_sum, FieldHandle, FieldValues, Grid2D, GridAxes, GriddedField, TimeAxis, TimeSeries,
};
pub use result::{MetricCategory, MetricResult, NonlinearityBreakdown, SideSummary};
pub use time::{Detrending, Frequency, Season, TimeWindow};
