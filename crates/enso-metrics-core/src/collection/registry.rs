//! The metric registry: all catalogs plus collection resolution.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::schema::{CollectionCatalog, CollectionSpec, CommonParameters, MetricSpec, VariableRequirement};
use crate::catalog::{ObservationCatalog, ObservationDataset, Region, RegionCatalog, VariableCatalog};
use crate::config::ObservationPolicy;
use crate::error::{EntityKind, MetricsError, MetricsResult};
use crate::tables::{self, TableSources};

/// A metric resolved within its collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMetric<'a> {
    pub collection: &'a CollectionSpec,
    pub spec: &'a MetricSpec,
}

impl<'a> ResolvedMetric<'a> {
    pub fn common(&self) -> &'a CommonParameters {
        &self.collection.common
    }

    /// Whether the event threshold is in standard deviations of the index,
    /// or `None` for metrics without an event definition.
    pub fn event_normalization(&self) -> Option<bool> {
        self.spec
            .event_definition
            .as_ref()
            .map(|event| event.normalization.unwrap_or(self.common().normalization))
    }
}

/// Regions, variables, observation datasets and collections, validated as a
/// whole.
///
/// Built once and shared read-only; every method takes `&self`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRegistry {
    regions: RegionCatalog,
    variables: VariableCatalog,
    observations: ObservationCatalog,
    collections: CollectionCatalog,
}

impl MetricRegistry {
    /// Assemble a registry and check every cross-reference between catalogs.
    pub fn new(
        regions: RegionCatalog,
        variables: VariableCatalog,
        observations: ObservationCatalog,
        collections: CollectionCatalog,
    ) -> MetricsResult<Self> {
        let registry = Self {
            regions,
            variables,
            observations,
            collections,
        };
        registry.validate_references()?;
        Ok(registry)
    }

    /// Registry built from the tables compiled into the crate.
    pub fn builtin() -> MetricsResult<Self> {
        Self::from_sources(&TableSources::builtin())
    }

    pub fn from_sources(sources: &TableSources<'_>) -> MetricsResult<Self> {
        let registry = Self::new(
            tables::parse_regions(sources.regions)?,
            tables::parse_variables(sources.variables)?,
            tables::parse_observations(sources.observations)?,
            tables::parse_collections(sources.collections)?,
        )?;
        info!(
            regions = registry.regions.len(),
            variables = registry.variables.len(),
            observations = registry.observations.len(),
            collections = registry.collections.len(),
            "Metric registry loaded"
        );
        Ok(registry)
    }

    fn validate_references(&self) -> MetricsResult<()> {
        for dataset in self.observations.iter() {
            for variable in dataset.variables.keys() {
                if !self.variables.contains(variable) {
                    return Err(MetricsError::configuration(
                        EntityKind::ObservationDataset,
                        &dataset.id,
                        format!("maps unknown variable '{}'", variable),
                    ));
                }
            }
        }

        for collection in self.collections.iter() {
            for metric in &collection.metrics {
                let context = format!("{}/{}", collection.id, metric.id);
                for region in metric.region_ids() {
                    if !self.regions.contains(region) {
                        return Err(MetricsError::configuration(
                            EntityKind::Region,
                            region,
                            format!("referenced by {} is not defined", context),
                        ));
                    }
                }
                for req in &metric.variables {
                    self.validate_requirement(&context, req)?;
                }
            }
        }
        Ok(())
    }

    fn validate_requirement(&self, context: &str, req: &VariableRequirement) -> MetricsResult<()> {
        if !self.variables.contains(&req.variable) {
            return Err(MetricsError::configuration(
                EntityKind::Variable,
                &req.variable,
                format!("referenced by {} is not defined", context),
            ));
        }
        for dataset_id in &req.observations {
            let dataset = self.observations.get(dataset_id).ok_or_else(|| {
                MetricsError::configuration(
                    EntityKind::ObservationDataset,
                    dataset_id,
                    format!("referenced by {} is not defined", context),
                )
            })?;
            if !dataset.provides(&req.variable) {
                return Err(MetricsError::configuration(
                    EntityKind::ObservationDataset,
                    dataset_id,
                    format!("listed for '{}' in {} but does not provide it", req.variable, context),
                ));
            }
        }
        Ok(())
    }

    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    pub fn variables(&self) -> &VariableCatalog {
        &self.variables
    }

    pub fn observations(&self) -> &ObservationCatalog {
        &self.observations
    }

    pub fn collections(&self) -> &CollectionCatalog {
        &self.collections
    }

    /// Collection ids in sorted order.
    pub fn list_collections(&self) -> Vec<&str> {
        self.collections.all_ids()
    }

    /// Metric ids of a collection in declaration order.
    pub fn list_metrics(&self, collection: &str) -> MetricsResult<Vec<&str>> {
        Ok(self.collections.lookup(collection)?.metric_ids())
    }

    /// Presentation order of a collection's metrics.
    pub fn plot_order(&self, collection: &str) -> MetricsResult<&[String]> {
        Ok(&self.collections.lookup(collection)?.plot_order)
    }

    /// Look up a metric within a collection.
    pub fn resolve(&self, collection: &str, metric: &str) -> MetricsResult<ResolvedMetric<'_>> {
        let collection = self.collections.lookup(collection)?;
        let spec = collection.metric(metric).ok_or_else(|| {
            MetricsError::configuration(
                EntityKind::Metric,
                metric,
                format!("not a member of collection '{}'", collection.id),
            )
        })?;
        debug!(collection = %collection.id, metric = %spec.id, "Resolved metric");
        Ok(ResolvedMetric { collection, spec })
    }

    /// Region for `variable`: the caller's override if present, else the
    /// metric's default. Overrides never modify the `MetricSpec`.
    pub fn resolve_region(
        &self,
        spec: &MetricSpec,
        variable: &str,
        overrides: &BTreeMap<String, String>,
    ) -> MetricsResult<&Region> {
        let req = requirement(spec, variable)?;
        match overrides.get(variable) {
            Some(region) => {
                debug!(metric = %spec.id, variable, region = %region, "Region override applied");
                self.regions.lookup(region)
            }
            None => self.regions.lookup(&req.region),
        }
    }

    /// Observation dataset for `variable`.
    ///
    /// An explicit choice must be one of the metric's acceptable datasets;
    /// without one, `policy` decides.
    pub fn select_observation(
        &self,
        spec: &MetricSpec,
        variable: &str,
        requested: Option<&str>,
        policy: ObservationPolicy,
    ) -> MetricsResult<&ObservationDataset> {
        let req = requirement(spec, variable)?;
        match requested {
            Some(id) => {
                if !req.observations.iter().any(|o| o == id) {
                    return Err(MetricsError::configuration(
                        EntityKind::ObservationDataset,
                        id,
                        format!(
                            "not an acceptable reference for '{}' in {}; expected one of {:?}",
                            variable, spec.id, req.observations
                        ),
                    ));
                }
                self.observations.lookup(id)
            }
            None => match policy {
                ObservationPolicy::FirstListed => {
                    let first = req.observations.first().ok_or_else(|| {
                        MetricsError::configuration(
                            EntityKind::Metric,
                            &spec.id,
                            format!("no observation dataset listed for '{}'", variable),
                        )
                    })?;
                    debug!(metric = %spec.id, variable, dataset = %first, "Defaulting to first listed observation");
                    self.observations.lookup(first)
                }
                ObservationPolicy::RequireExplicit => Err(MetricsError::configuration(
                    EntityKind::ObservationDataset,
                    variable,
                    format!(
                        "no dataset selected for {} and the observation policy requires one",
                        spec.id
                    ),
                )),
            },
        }
    }
}

fn requirement<'a>(spec: &'a MetricSpec, variable: &str) -> MetricsResult<&'a VariableRequirement> {
    spec.requirement(variable).ok_or_else(|| {
        MetricsError::configuration(
            EntityKind::Variable,
            variable,
            format!("not used by metric '{}'", spec.id),
        )
    })
}
