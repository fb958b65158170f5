//! Embedded definition tables.
//!
//! The built-in regions, variables, observation datasets and collections are
//! TOML documents compiled into the crate. [`TableSources`] also accepts
//! caller-supplied text so deployments and tests can ship their own tables
//! through the same parser and validation.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::catalog::{
    Catalog, CatalogEntry, ObservationCatalog, ObservationDataset, Region, RegionCatalog, Variable,
    VariableCatalog,
};
use crate::collection::{CollectionCatalog, CollectionSpec};
use crate::error::{EntityKind, MetricsError, MetricsResult};

const REGIONS: &str = include_str!("../data/regions.toml");
const VARIABLES: &str = include_str!("../data/variables.toml");
const OBSERVATIONS: &str = include_str!("../data/observations.toml");
const COLLECTIONS: &str = include_str!("../data/collections.toml");

/// TOML text for the four definition tables.
#[derive(Debug, Clone, Copy)]
pub struct TableSources<'a> {
    pub regions: &'a str,
    pub variables: &'a str,
    pub observations: &'a str,
    pub collections: &'a str,
}

impl TableSources<'static> {
    /// Tables compiled into the crate.
    pub fn builtin() -> Self {
        Self {
            regions: REGIONS,
            variables: VARIABLES,
            observations: OBSERVATIONS,
            collections: COLLECTIONS,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionTable {
    regions: BTreeMap<String, Region>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VariableTable {
    variables: BTreeMap<String, Variable>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ObservationTable {
    datasets: BTreeMap<String, ObservationDataset>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionTable {
    collections: BTreeMap<String, CollectionSpec>,
}

fn parse<T: DeserializeOwned>(table: &str, text: &str) -> MetricsResult<T> {
    toml::from_str(text).map_err(|e| {
        MetricsError::configuration(EntityKind::Catalog, table, format!("failed to parse: {}", e))
    })
}

fn build<T: CatalogEntry>(entries: BTreeMap<String, T>) -> MetricsResult<Catalog<T>> {
    Catalog::from_entries(entries)
}

pub fn parse_regions(text: &str) -> MetricsResult<RegionCatalog> {
    build(parse::<RegionTable>("regions", text)?.regions)
}

pub fn parse_variables(text: &str) -> MetricsResult<VariableCatalog> {
    build(parse::<VariableTable>("variables", text)?.variables)
}

pub fn parse_observations(text: &str) -> MetricsResult<ObservationCatalog> {
    build(parse::<ObservationTable>("observations", text)?.datasets)
}

pub fn parse_collections(text: &str) -> MetricsResult<CollectionCatalog> {
    build(parse::<CollectionTable>("collections", text)?.collections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_regions_parse() {
        let regions = parse_regions(REGIONS).unwrap();
        let nino34 = regions.lookup("nino3.4").unwrap();
        assert_eq!(nino34.latitude, (-5.0, 5.0));
        assert_eq!(nino34.longitude, (190.0, 240.0));
        assert_eq!(regions.lookup("MED").unwrap().longitude, (350.0, 400.0));
        assert!(regions.lookup("CEP").unwrap().masks_land());
    }

    #[test]
    fn test_builtin_variables_parse() {
        let variables = parse_variables(VARIABLES).unwrap();
        let names: Vec<String> = variables
            .expand("thf")
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(names, vec!["+hfls", "+hfss", "+rlds", "-rlus", "+rsds", "-rsus"]);
    }

    #[test]
    fn test_builtin_observations_parse() {
        let observations = parse_observations(OBSERVATIONS).unwrap();
        let tropflux = observations.lookup("Tropflux").unwrap();
        assert_eq!(tropflux.expand("thf").unwrap()[0].name, "netflux");
        let aviso = observations.lookup("AVISO").unwrap();
        assert_eq!(aviso.expand("ssh").unwrap()[0].name, "sla");
    }

    #[test]
    fn test_builtin_collections_parse() {
        let collections = parse_collections(COLLECTIONS).unwrap();
        assert_eq!(
            collections.all_ids(),
            vec!["ENSO_THF", "ENSO_perf", "ENSO_proc", "ENSO_tau", "ENSO_tel", "all_metrics"]
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let text = r#"
            [regions.box]
            long_name = "box"
            latitude = [-5.0, 5.0]
            longitude = [0.0, 10.0]
            maskland = true
        "#;
        let err = parse_regions(text).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("regions"));
    }
}
