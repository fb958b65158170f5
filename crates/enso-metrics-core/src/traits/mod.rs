//! Contracts between the engine and its external collaborators.
//!
//! # Traits
//!
//! - [`FieldReader`]: loads regional series and gridded fields from storage
//! - [`StatisticsKernels`]: numerical building blocks (detrending, anomalies,
//!   regression, profiles, RMSE)
//! - [`GridConformer`]: moves a 2-D field onto another grid
//!
//! All collaborators are `Send + Sync` and report failures as
//! [`CollaboratorError`](crate::error::CollaboratorError); the engine adds the
//! metric and variable context.

mod field_reader;
mod kernels;
mod regridder;

pub use field_reader::FieldReader;
pub use kernels::{KernelResult, Profile, ProfileAxis, RegressionFit, SignPartition, StatisticsKernels};
pub use regridder::GridConformer;
