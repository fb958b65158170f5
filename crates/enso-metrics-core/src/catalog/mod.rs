//! Read-only catalogs of regions, variables and observation datasets.
//!
//! Every catalog is a [`Catalog<T>`]: an id-keyed, sorted map whose entries
//! are validated once when the catalog is built and never change afterwards.

mod expression;
mod observation;
mod region;
mod variable;

use std::collections::BTreeMap;

pub use expression::{FieldExpr, PrimitiveTerm, Sign, Term};
pub use observation::ObservationDataset;
pub use region::Region;
pub use variable::{UnitKind, Variable};

use crate::error::{EntityKind, MetricsError, MetricsResult};

/// An entry that can live in a [`Catalog`].
pub trait CatalogEntry: Sized {
    /// Entity kind reported in lookup errors.
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Set the id from the table key the entry was declared under.
    fn assign_id(&mut self, id: String);

    /// Check invariants local to the entry.
    fn validate(&self) -> MetricsResult<()>;

    /// Check invariants that involve other entries of the same catalog.
    fn validate_catalog(_catalog: &Catalog<Self>) -> MetricsResult<()> {
        Ok(())
    }
}

/// Immutable id-keyed collection of validated entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<T> {
    entries: BTreeMap<String, T>,
}

impl<T: CatalogEntry> Catalog<T> {
    /// Build from table entries keyed by id.
    pub fn from_entries(entries: BTreeMap<String, T>) -> MetricsResult<Self> {
        let entries = entries
            .into_iter()
            .map(|(id, mut entry)| {
                entry.assign_id(id.clone());
                (id, entry)
            })
            .collect();
        Self::validated(entries)
    }

    /// Build from entries carrying their own ids; duplicates are rejected.
    pub fn from_vec(items: Vec<T>) -> MetricsResult<Self> {
        let mut entries = BTreeMap::new();
        for item in items {
            let id = item.id().to_string();
            if entries.insert(id.clone(), item).is_some() {
                return Err(MetricsError::configuration(T::KIND, id, "declared more than once"));
            }
        }
        Self::validated(entries)
    }

    fn validated(entries: BTreeMap<String, T>) -> MetricsResult<Self> {
        for (id, entry) in &entries {
            if id.trim().is_empty() {
                return Err(MetricsError::configuration(T::KIND, id, "empty id"));
            }
            entry.validate()?;
        }
        let catalog = Self { entries };
        T::validate_catalog(&catalog)?;
        Ok(catalog)
    }

    /// Entry with the given id, or a configuration error naming it.
    pub fn lookup(&self, id: &str) -> MetricsResult<&T> {
        self.entries
            .get(id)
            .ok_or_else(|| MetricsError::unknown(T::KIND, id))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All ids in sorted order.
    pub fn all_ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog<Variable> {
    /// Primitive model fields making up `id`.
    pub fn expand(&self, id: &str) -> MetricsResult<Vec<PrimitiveTerm>> {
        let lookup = |name: &str| self.entries.get(name).map(|v| &v.source);
        self.lookup(id)?
            .source
            .expand(EntityKind::Variable, id, &lookup)
    }
}

pub type RegionCatalog = Catalog<Region>;
pub type VariableCatalog = Catalog<Variable>;
pub type ObservationCatalog = Catalog<ObservationDataset>;

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(id: &str, source: FieldExpr) -> Variable {
        Variable {
            id: id.to_string(),
            long_name: id.to_string(),
            cf_names: vec![id.to_string()],
            units: "W m-2".to_string(),
            kind: UnitKind::HeatFlux,
            source,
        }
    }

    #[test]
    fn test_lookup_unknown_names_id() {
        let catalog = RegionCatalog::from_vec(vec![Region::new(
            "nino3",
            "Niño 3",
            (-5.0, 5.0),
            (210.0, 270.0),
        )])
        .unwrap();
        assert!(catalog.lookup("nino3").is_ok());
        let err = catalog.lookup("nino9").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("nino9"));
        assert!(err.to_string().contains("region"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let r = Region::new("nino3", "Niño 3", (-5.0, 5.0), (210.0, 270.0));
        let err = RegionCatalog::from_vec(vec![r.clone(), r]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_all_ids_sorted() {
        let catalog = RegionCatalog::from_vec(vec![
            Region::new("nino4", "Niño 4", (-5.0, 5.0), (160.0, 210.0)),
            Region::new("nino3", "Niño 3", (-5.0, 5.0), (210.0, 270.0)),
        ])
        .unwrap();
        assert_eq!(catalog.all_ids(), vec!["nino3", "nino4"]);
    }

    #[test]
    fn test_from_entries_assigns_ids() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "nino3".to_string(),
            Region::new("", "Niño 3", (-5.0, 5.0), (210.0, 270.0)),
        );
        let catalog = RegionCatalog::from_entries(entries).unwrap();
        assert_eq!(catalog.lookup("nino3").unwrap().id, "nino3");
    }

    #[test]
    fn test_variable_catalog_detects_cycles() {
        let a = variable(
            "a",
            FieldExpr::Composite(vec![Term::new("b", Sign::Add)]),
        );
        let b = variable(
            "b",
            FieldExpr::Composite(vec![Term::new("a", Sign::Subtract)]),
        );
        let err = VariableCatalog::from_vec(vec![a, b]).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("cycles"));
    }

    #[test]
    fn test_variable_catalog_expands_through_entries() {
        let catalog = VariableCatalog::from_vec(vec![
            variable("lhf", FieldExpr::direct("hfls")),
            variable(
                "net",
                FieldExpr::Composite(vec![
                    Term::new("lhf", Sign::Subtract),
                    Term::new("rsds", Sign::Add),
                ]),
            ),
        ])
        .unwrap();
        let terms = catalog.expand("net").unwrap();
        assert_eq!(terms[0].name, "hfls");
        assert_eq!(terms[0].sign, Sign::Subtract);
        assert_eq!(terms[1].name, "rsds");
    }
}
