//! Reference observational datasets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CatalogEntry, FieldExpr, PrimitiveTerm};
use crate::error::{EntityKind, MetricsError, MetricsResult};

/// An observational product and the native names of the variables it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationDataset {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// File naming template; `<var_name>` is replaced with the native name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Canonical variable id -> storage in this dataset.
    pub variables: BTreeMap<String, FieldExpr>,
}

impl ObservationDataset {
    /// Whether the dataset provides `variable`.
    pub fn provides(&self, variable: &str) -> bool {
        self.variables.contains_key(variable)
    }

    pub fn expression(&self, variable: &str) -> MetricsResult<&FieldExpr> {
        self.variables.get(variable).ok_or_else(|| {
            MetricsError::configuration(
                EntityKind::ObservationDataset,
                &self.id,
                format!("does not provide variable '{}'", variable),
            )
        })
    }

    /// Primitive native fields making up `variable` in this dataset.
    pub fn expand(&self, variable: &str) -> MetricsResult<Vec<PrimitiveTerm>> {
        let lookup = |name: &str| self.variables.get(name);
        let owner = format!("{}/{}", self.id, variable);
        self.expression(variable)?
            .expand(EntityKind::ObservationDataset, &owner, &lookup)
    }

    /// File name for a native field, when the dataset declares a template.
    pub fn file_name_for(&self, native_name: &str) -> Option<String> {
        self.file_name
            .as_ref()
            .map(|template| template.replace("<var_name>", native_name))
    }
}

impl CatalogEntry for ObservationDataset {
    const KIND: EntityKind = EntityKind::ObservationDataset;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> MetricsResult<()> {
        if self.variables.is_empty() {
            return Err(MetricsError::configuration(
                EntityKind::ObservationDataset,
                &self.id,
                "provides no variables",
            ));
        }
        for variable in self.variables.keys() {
            self.expand(variable)?;
        }
        Ok(())
    }
}
