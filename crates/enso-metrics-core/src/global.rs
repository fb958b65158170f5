//! Process-wide registry built from the embedded tables.
//!
//! # Usage
//!
//! ```rust
//! use enso_metrics_core::global::{global_registry, initialize_global_registry};
//!
//! // At startup
//! initialize_global_registry().expect("built-in tables are valid");
//!
//! // Anywhere afterwards
//! let registry = global_registry().expect("initialized above");
//! assert!(registry.list_collections().contains(&"ENSO_perf"));
//! ```
//!
//! # Thread Safety
//!
//! `OnceLock` guarantees a single stored registry. Two threads racing through
//! initialization may both build one; the loser's copy is dropped and both
//! observe the winner's.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::collection::MetricRegistry;
use crate::error::{EntityKind, MetricsError, MetricsResult};

static GLOBAL_REGISTRY: OnceLock<Arc<MetricRegistry>> = OnceLock::new();

/// Build and publish the built-in registry. Later calls return the stored one.
pub fn initialize_global_registry() -> MetricsResult<Arc<MetricRegistry>> {
    if let Some(existing) = GLOBAL_REGISTRY.get() {
        debug!("Global metric registry already initialized");
        return Ok(Arc::clone(existing));
    }

    let built = Arc::new(MetricRegistry::builtin()?);
    Ok(Arc::clone(GLOBAL_REGISTRY.get_or_init(|| built)))
}

/// The published registry, or a configuration error when
/// [`initialize_global_registry`] has not run yet.
pub fn global_registry() -> MetricsResult<Arc<MetricRegistry>> {
    GLOBAL_REGISTRY.get().cloned().ok_or_else(|| {
        MetricsError::configuration(
            EntityKind::Catalog,
            "global",
            "registry not initialized; call initialize_global_registry() at startup",
        )
    })
}

/// Whether the registry has been published.
pub fn is_initialized() -> bool {
    GLOBAL_REGISTRY.get().is_some()
}
