//! Geographic boxes.

use serde::{Deserialize, Serialize};

use super::CatalogEntry;
use crate::error::{EntityKind, MetricsError, MetricsResult};

/// A named latitude/longitude box.
///
/// Longitudes are degrees east and increase monotonically across the box, so
/// boxes crossing the prime meridian use upper bounds above 360
/// (e.g. the Mediterranean is 350..400).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub long_name: String,
    pub latitude: (f64, f64),
    pub longitude: (f64, f64),
    /// Keep only ocean points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_land: Option<bool>,
    /// Keep only land points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_ocean: Option<bool>,
}

impl Region {
    pub fn new(
        id: impl Into<String>,
        long_name: impl Into<String>,
        latitude: (f64, f64),
        longitude: (f64, f64),
    ) -> Self {
        Self {
            id: id.into(),
            long_name: long_name.into(),
            latitude,
            longitude,
            mask_land: None,
            mask_ocean: None,
        }
    }

    /// Whether the point lies inside the box, treating longitudes modulo 360.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if lat < self.latitude.0 || lat > self.latitude.1 {
            return false;
        }
        let (west, east) = self.longitude;
        let shifted = west + (lon - west).rem_euclid(360.0);
        shifted <= east || (east - west >= 360.0)
    }

    pub fn masks_land(&self) -> bool {
        self.mask_land.unwrap_or(false)
    }

    pub fn masks_ocean(&self) -> bool {
        self.mask_ocean.unwrap_or(false)
    }
}

impl CatalogEntry for Region {
    const KIND: EntityKind = EntityKind::Region;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> MetricsResult<()> {
        let (south, north) = self.latitude;
        let (west, east) = self.longitude;
        let invalid = |reason: String| MetricsError::configuration(EntityKind::Region, &self.id, reason);

        if !(south.is_finite() && north.is_finite() && west.is_finite() && east.is_finite()) {
            return Err(invalid("bounds must be finite".to_string()));
        }
        if south >= north {
            return Err(invalid(format!("latitude {} must be below {}", south, north)));
        }
        if south < -90.0 || north > 90.0 {
            return Err(invalid(format!("latitude ({}, {}) outside [-90, 90]", south, north)));
        }
        if west >= east {
            return Err(invalid(format!("longitude {} must be below {}", west, east)));
        }
        if east - west > 360.0 {
            return Err(invalid(format!("longitude span {} exceeds 360", east - west)));
        }
        if self.masks_land() && self.masks_ocean() {
            return Err(invalid("cannot mask both land and ocean".to_string()));
        }
        Ok(())
    }
}
