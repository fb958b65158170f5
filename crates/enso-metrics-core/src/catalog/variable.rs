//! Canonical physical variables.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Catalog, CatalogEntry, FieldExpr};
use crate::error::{EntityKind, MetricsError, MetricsResult};

/// Physical kind of a variable, used to pick unit normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Temperature,
    HeatFlux,
    WindStress,
    Precipitation,
    SeaSurfaceHeight,
    Pressure,
    Depth,
    Area,
    Fraction,
}

impl UnitKind {
    pub fn all() -> [UnitKind; 9] {
        [
            Self::Temperature,
            Self::HeatFlux,
            Self::WindStress,
            Self::Precipitation,
            Self::SeaSurfaceHeight,
            Self::Pressure,
            Self::Depth,
            Self::Area,
            Self::Fraction,
        ]
    }

    /// Units every field of this kind is converted to before statistics.
    pub fn canonical_units(&self) -> &'static str {
        match self {
            Self::Temperature => "C",
            Self::HeatFlux => "W/m2",
            Self::WindStress => "N/m2",
            Self::Precipitation => "mm/day",
            Self::SeaSurfaceHeight => "cm",
            Self::Pressure => "hPa",
            Self::Depth => "m",
            Self::Area => "m2",
            Self::Fraction => "%",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::HeatFlux => "heat flux",
            Self::WindStress => "wind stress",
            Self::Precipitation => "precipitation flux",
            Self::SeaSurfaceHeight => "sea surface height",
            Self::Pressure => "pressure",
            Self::Depth => "depth",
            Self::Area => "area",
            Self::Fraction => "fraction",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A canonical variable and how models store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variable {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub long_name: String,
    pub cf_names: Vec<String>,
    /// Units as found in model output.
    pub units: String,
    pub kind: UnitKind,
    pub source: FieldExpr,
}

impl CatalogEntry for Variable {
    const KIND: EntityKind = EntityKind::Variable;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> MetricsResult<()> {
        if self.units.trim().is_empty() {
            return Err(MetricsError::configuration(
                EntityKind::Variable,
                &self.id,
                "units must not be empty",
            ));
        }
        if self.cf_names.is_empty() {
            return Err(MetricsError::configuration(
                EntityKind::Variable,
                &self.id,
                "at least one CF standard name is required",
            ));
        }
        Ok(())
    }

    fn validate_catalog(catalog: &Catalog<Self>) -> MetricsResult<()> {
        for id in catalog.all_ids() {
            catalog.expand(id)?;
        }
        Ok(())
    }
}
