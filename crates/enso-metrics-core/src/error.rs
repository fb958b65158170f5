//! Error types for enso-metrics-core.
//!
//! This module defines the central error type [`MetricsError`] shared by the
//! registry and the computation engine, along with the [`MetricsResult<T>`]
//! type alias and [`CollaboratorError`], the failure type returned by field
//! readers, statistics kernels and grid conformers.
//!
//! # Examples
//!
//! ```rust
//! use enso_metrics_core::error::{EntityKind, MetricsError};
//!
//! let err = MetricsError::unknown(EntityKind::Metric, "EnsoAmplitude");
//! assert!(err.is_configuration());
//! assert!(err.to_string().contains("EnsoAmplitude"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of entity a configuration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Collection,
    Metric,
    Region,
    Variable,
    ObservationDataset,
    FieldHandle,
    /// An embedded or caller-supplied table as a whole.
    Catalog,
    /// A runtime setting in [`crate::config::MetricsConfig`].
    Setting,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Metric => "metric",
            Self::Region => "region",
            Self::Variable => "variable",
            Self::ObservationDataset => "observation dataset",
            Self::FieldHandle => "field handle",
            Self::Catalog => "catalog",
            Self::Setting => "setting",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an external collaborator.
///
/// Collaborators know nothing about metrics; the engine wraps these into
/// [`MetricsError::Upstream`] together with the metric and variable being
/// processed.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The requested native field does not exist behind the handle.
    #[error("Field '{field}' not found in {handle}")]
    FieldNotFound { handle: String, field: String },

    /// A kernel needs more samples than it was given.
    #[error("Insufficient samples for {operation}: need {needed}, got {actual}")]
    InsufficientSamples {
        operation: String,
        needed: usize,
        actual: usize,
    },

    /// Arrays passed to a kernel or regridder have incompatible shapes.
    #[error("Shape mismatch in {operation}: {detail}")]
    ShapeMismatch { operation: String, detail: String },

    /// Storage-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl CollaboratorError {
    /// Create an [`CollaboratorError::InsufficientSamples`] error.
    pub fn insufficient(operation: impl Into<String>, needed: usize, actual: usize) -> Self {
        Self::InsufficientSamples {
            operation: operation.into(),
            needed,
            actual,
        }
    }

    /// Create a [`CollaboratorError::ShapeMismatch`] error.
    pub fn shape(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            operation: operation.into(),
            detail: detail.into(),
        }
    }
}

/// Top-level error type for registry lookups and metric computation.
///
/// Every variant is terminal for the call that produced it; a caller running
/// a whole collection records the failure and moves on to the next metric.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// An identifier or table entry could not be resolved, or a table failed
    /// load-time validation.
    ///
    /// # When This Occurs
    ///
    /// - Unknown collection, or a metric that is not a member of the collection
    /// - Unknown region, variable or observation dataset id
    /// - Observation dataset outside the metric's acceptable list
    /// - Cyclic or empty composite variable definitions
    /// - Missing field handle for a required variable
    #[error("Configuration error for {kind} '{id}': {reason}")]
    Configuration {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    /// Model and observation data cannot be reconciled onto a usable period.
    ///
    /// # When This Occurs
    ///
    /// - Time axes of two fields do not overlap
    /// - Fewer overlapping steps than the collection's minimum
    /// - Composite terms with incompatible grids
    #[error("Data alignment error in {metric}: {reason}")]
    DataAlignment { metric: String, reason: String },

    /// Normalization or error propagation produced an undefined value.
    ///
    /// # When This Occurs
    ///
    /// - Observation statistic equal to zero in a ratio
    /// - Non-finite intermediate values
    #[error("Numeric error in {context}: {reason}")]
    Numeric { context: String, reason: String },

    /// A collaborator failed while the engine was processing a variable.
    #[error("Upstream failure in {metric} for variable '{variable}': {source}")]
    Upstream {
        metric: String,
        variable: String,
        #[source]
        source: CollaboratorError,
    },
}

impl MetricsError {
    /// Unknown identifier of the given kind.
    pub fn unknown(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Configuration {
            kind,
            id: id.into(),
            reason: "not found".to_string(),
        }
    }

    pub fn configuration(kind: EntityKind, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            kind,
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn alignment(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataAlignment {
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    pub fn numeric(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Numeric {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn upstream(
        metric: impl Into<String>,
        variable: impl Into<String>,
        source: CollaboratorError,
    ) -> Self {
        Self::Upstream {
            metric: metric.into(),
            variable: variable.into(),
            source,
        }
    }

    /// Returns true for [`MetricsError::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true for [`MetricsError::DataAlignment`].
    pub fn is_alignment(&self) -> bool {
        matches!(self, Self::DataAlignment { .. })
    }

    /// Returns true for [`MetricsError::Numeric`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }

    /// Returns true for [`MetricsError::Upstream`].
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Whether repeating the same call could succeed. Every variant describes
    /// a property of the inputs, so this is always false.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Stable name of the error kind, used in batch summaries.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "ConfigurationError",
            Self::DataAlignment { .. } => "DataAlignmentError",
            Self::Numeric { .. } => "NumericError",
            Self::Upstream { .. } => "UpstreamIOError",
        }
    }
}

impl From<toml::de::Error> for MetricsError {
    fn from(err: toml::de::Error) -> Self {
        MetricsError::configuration(EntityKind::Catalog, "toml", err.to_string())
    }
}

impl From<config::ConfigError> for MetricsError {
    fn from(err: config::ConfigError) -> Self {
        MetricsError::configuration(EntityKind::Setting, "config", err.to_string())
    }
}

/// Result type alias for registry and engine operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unknown_names_kind_and_id() {
        let err = MetricsError::unknown(EntityKind::Collection, "ENSO_xyz");
        let msg = err.to_string();
        assert!(msg.contains("collection"));
        assert!(msg.contains("ENSO_xyz"));
        assert!(err.is_configuration());
        assert_eq!(err.kind_name(), "ConfigurationError");
    }

    #[test]
    fn test_alignment_display() {
        let err = MetricsError::alignment("EnsoAmpl", "no overlapping time steps");
        assert!(err.is_alignment());
        assert!(err.to_string().contains("EnsoAmpl"));
        assert!(err.to_string().contains("no overlapping"));
    }

    #[test]
    fn test_numeric_display() {
        let err = MetricsError::numeric("ratio", "observation value is zero");
        assert!(err.is_numeric());
        assert_eq!(err.kind_name(), "NumericError");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_upstream_keeps_source() {
        let source = CollaboratorError::FieldNotFound {
            handle: "model.nc".to_string(),
            field: "ts".to_string(),
        };
        let err = MetricsError::upstream("EnsoAmpl", "sst", source);
        assert!(err.is_upstream());
        assert!(err.to_string().contains("sst"));
        let inner = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(inner.contains("model.nc"));
    }

    #[test]
    fn test_collaborator_helpers() {
        let err = CollaboratorError::insufficient("regression", 3, 1);
        assert!(err.to_string().contains("need 3, got 1"));
        let err = CollaboratorError::shape("rmse", "12 vs 10");
        assert!(err.to_string().contains("12 vs 10"));
    }

    #[test]
    fn test_from_toml_error() {
        let parse: Result<toml::Value, _> = toml::from_str("a = [");
        let err: MetricsError = parse.unwrap_err().into();
        assert!(err.is_configuration());
    }
}
