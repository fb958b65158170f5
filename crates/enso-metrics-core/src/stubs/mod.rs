//! Stub collaborators for development and testing.
//!
//! # TEST ONLY
//!
//! Every export is gated with `#[cfg(any(test, feature = "test-utils"))]`.
//! Downstream crates opt in from their dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! enso-metrics-core = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! - [`InMemoryFieldReader`]: serves preloaded series and grids and records
//!   every request it receives.

#[cfg(any(test, feature = "test-utils"))]
mod field_reader_stub;

#[cfg(any(test, feature = "test-utils"))]
pub use field_reader_stub::{InMemoryFieldReader, ReadKind, ReadRequest};
