//! Conversion of fields to the canonical units of their variable kind.
//!
//! Readers hand back whatever units the dataset stores. Every statistic runs
//! on canonical units (see [`UnitKind::canonical_units`]) so model and
//! observations are comparable.

use enso_metrics_core::types::FieldValues;
use enso_metrics_core::UnitKind;
use tracing::{debug, warn};

const KELVIN_OFFSET: f64 = 273.15;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Temperatures with an unlabelled mean above this are taken to be Kelvin.
const KELVIN_GUESS_THRESHOLD: f64 = 200.0;

/// Affine conversion `value * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub scale: f64,
    pub offset: f64,
}

impl Conversion {
    pub const IDENTITY: Conversion = Conversion { scale: 1.0, offset: 0.0 };

    fn scale(scale: f64) -> Self {
        Self { scale, offset: 0.0 }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }
}

fn normalized(units: &str) -> String {
    units
        .trim()
        .replace("**", "")
        .replace('^', "")
        .replace('/', " / ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Conversion from `units` to the canonical units of `kind`, if known.
pub fn conversion(kind: UnitKind, units: &str) -> Option<Conversion> {
    let u = normalized(units);
    let c = match (kind, u.as_str()) {
        (UnitKind::Temperature, "K" | "degK" | "kelvin" | "Kelvin") => Conversion {
            scale: 1.0,
            offset: -KELVIN_OFFSET,
        },
        (UnitKind::Temperature, "C" | "degC" | "deg_C" | "celsius" | "Celsius" | "degree_Celsius") => {
            Conversion::IDENTITY
        }
        (UnitKind::Precipitation, "kg m-2 s-1" | "kg / m2 / s" | "kg / m2 s") => {
            Conversion::scale(SECONDS_PER_DAY)
        }
        (UnitKind::Precipitation, "mm / day" | "mm day-1" | "mm d-1") => Conversion::IDENTITY,
        (UnitKind::SeaSurfaceHeight, "m") => Conversion::scale(100.0),
        (UnitKind::SeaSurfaceHeight, "cm") => Conversion::IDENTITY,
        (UnitKind::SeaSurfaceHeight, "mm") => Conversion::scale(0.1),
        (UnitKind::WindStress, "Pa" | "N m-2" | "N / m2") => Conversion::IDENTITY,
        (UnitKind::HeatFlux, "W m-2" | "W / m2") => Conversion::IDENTITY,
        (UnitKind::Pressure, "Pa") => Conversion::scale(0.01),
        (UnitKind::Pressure, "hPa" | "mb" | "mbar") => Conversion::IDENTITY,
        (UnitKind::Depth, "m") => Conversion::IDENTITY,
        (UnitKind::Depth, "cm") => Conversion::scale(0.01),
        (UnitKind::Area, "m2" | "m 2") => Conversion::IDENTITY,
        (UnitKind::Fraction, "1" | "0-1" | "fraction") => Conversion::scale(100.0),
        (UnitKind::Fraction, "%") => Conversion::IDENTITY,
        _ => return None,
    };
    Some(c)
}

/// Convert `data` in place to the canonical units of `kind`.
///
/// Unknown units pass through unchanged with a warning, except temperatures
/// whose mean is implausible for Celsius, which are treated as Kelvin.
pub fn normalize_units<T: FieldValues>(data: &mut T, kind: UnitKind) {
    let from = data.units().to_string();
    let target = kind.canonical_units();

    let conv = match conversion(kind, &from) {
        Some(c) => c,
        None if kind == UnitKind::Temperature
            && data.mean().map_or(false, |m| m > KELVIN_GUESS_THRESHOLD) =>
        {
            warn!(units = %from, "Unrecognized temperature units with Kelvin-range mean; converting from K");
            Conversion {
                scale: 1.0,
                offset: -KELVIN_OFFSET,
            }
        }
        None => {
            warn!(units = %from, kind = %kind, "Unrecognized units; values passed through unchanged");
            Conversion::IDENTITY
        }
    };

    if !conv.is_identity() {
        debug!(from = %from, to = target, scale = conv.scale, offset = conv.offset, "Converting units");
        data.map_values(|v| conv.apply(v));
    }
    data.set_units(target.to_string());
}
