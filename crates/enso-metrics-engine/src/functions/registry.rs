//! Metric id to algorithm table.

use std::collections::BTreeMap;

use enso_metrics_core::traits::ProfileAxis;

use super::{MetricAlgorithm, MetricFunction, RegressionRoles, SelfStatistic};

const REF_STD: &str = "Using CDAT std dev calculation";
const REF_REGRESSION: &str = "Using CDAT regression calculation";
const REF_RMSE: &str = "Using CDAT regridding and rms (uncentered and biased) calculation";

/// Registered metric functions, keyed by metric id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, MetricFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every metric the engine can compute out of the box.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let self_stats = [
            ("EnsoAmpl", "ENSO amplitude", SelfStatistic::Amplitude, None),
            ("EnsoSeasonality", "ENSO seasonality", SelfStatistic::Seasonality, Some("")),
            ("EnsoSstSkew", "ENSO skewness", SelfStatistic::Skewness, Some("")),
        ];
        for (id, name, stat, units) in self_stats {
            let mut f = MetricFunction::new(id, name, MetricAlgorithm::SelfStatistic(stat))
                .with_reference(REF_STD);
            if let Some(units) = units {
                f = f.with_units(units);
            }
            registry.register(f);
        }

        let heat_fluxes = [
            ("EnsoFbSstThf", "thf", "Heat flux feedback (alpha)"),
            ("EnsoFbSstLhf", "lhf", "Latent feedback (alpha_lh)"),
            ("EnsoFbSstLwr", "lwr", "Longwave feedback (alpha_lwr)"),
            ("EnsoFbSstShf", "shf", "Sensible feedback (alpha_sh)"),
            ("EnsoFbSstSwr", "swr", "Shortwave feedback (alpha_sw)"),
        ];
        for (id, flux, name) in heat_fluxes {
            registry.register(
                MetricFunction::new(id, name, MetricAlgorithm::Regression(RegressionRoles::new("sst", flux)))
                    .with_units("W/m2/C")
                    .with_reference(REF_REGRESSION),
            );
        }

        let couplings = [
            ("EnsoFbSstTaux", "Bjerknes feedback (mu)", RegressionRoles::new("sst", "taux").scaled(1000.0), "10-3 N/m2/C"),
            ("EnsoFbSshSst", "Thermocline feedback", RegressionRoles::new("ssh", "sst"), "C/cm"),
            ("EnsoFbTauxSsh", "Wind stress driven SSH feedback", RegressionRoles::new("taux", "ssh"), "cm/(N/m2)"),
        ];
        for (id, name, roles, units) in couplings {
            registry.register(
                MetricFunction::new(id, name, MetricAlgorithm::Regression(roles))
                    .with_units(units)
                    .with_reference(REF_REGRESSION),
            );
        }

        let lat_profiles = [
            ("BiasPrLatRmse", "Precipitation meridional bias"),
            ("BiasSstLatRmse", "SST meridional bias"),
            ("BiasSshLatRmse", "SSH meridional bias"),
            ("BiasTauxLatRmse", "Zonal wind stress meridional bias"),
        ];
        for (id, name) in lat_profiles {
            registry.register(
                MetricFunction::new(id, name, MetricAlgorithm::ProfileRmse(ProfileAxis::Latitude))
                    .with_reference(REF_RMSE),
            );
        }

        let lon_profiles = [
            ("BiasPrLonRmse", "Precipitation zonal bias"),
            ("BiasSstLonRmse", "SST zonal bias"),
            ("BiasSshLonRmse", "SSH zonal bias"),
            ("BiasTauxLonRmse", "Zonal wind stress zonal bias"),
            ("BiasTauyLonRmse", "Meridional wind stress zonal bias"),
            ("BiasMldLonRmse", "Mixed layer depth zonal bias"),
        ];
        for (id, name) in lon_profiles {
            registry.register(
                MetricFunction::new(id, name, MetricAlgorithm::ProfileRmse(ProfileAxis::Longitude))
                    .with_reference(REF_RMSE),
            );
        }

        registry
    }

    /// Add or replace a function.
    pub fn register(&mut self, function: MetricFunction) {
        self.functions.insert(function.id.clone(), function);
    }

    pub fn get(&self, id: &str) -> Option<&MetricFunction> {
        self.functions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.functions.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
