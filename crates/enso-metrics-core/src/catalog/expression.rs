//! Field expressions: how a canonical variable maps onto stored fields.
//!
//! A variable is either stored directly under a native name or derived as an
//! ordered signed sum of terms, e.g. `thf = lhf + shf + lwr + swr`. Terms that
//! name another entry of the same mapping expand recursively, so the single
//! reducer [`FieldExpr::expand`] serves both the variable catalog and every
//! observation dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, MetricsError, MetricsResult};

/// Sign of a composite term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Add,
    Subtract,
}

impl Sign {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Add => value,
            Self::Subtract => -value,
        }
    }

    /// Sign of a term nested under a term with sign `self`.
    pub fn compose(self, inner: Sign) -> Sign {
        if self == inner {
            Sign::Add
        } else {
            Sign::Subtract
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
        }
    }
}

/// One entry of a composite expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Term {
    pub term: String,
    pub sign: Sign,
}

impl Term {
    pub fn new(term: impl Into<String>, sign: Sign) -> Self {
        Self {
            term: term.into(),
            sign,
        }
    }
}

/// Storage of a canonical variable.
///
/// Deserializes from either a string (`sst = "ts"`) or a list of terms
/// (`lwr = [{ term = "rlds", sign = "add" }, { term = "rlus", sign = "subtract" }]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldExpr {
    Direct(String),
    Composite(Vec<Term>),
}

/// A stored field after full expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveTerm {
    pub name: String,
    pub sign: Sign,
}

impl fmt::Display for PrimitiveTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign.symbol(), self.name)
    }
}

impl FieldExpr {
    pub fn direct(name: impl Into<String>) -> Self {
        Self::Direct(name.into())
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Flatten into primitive stored fields, in declaration order.
    ///
    /// `lookup` resolves composite term names against the mapping that owns
    /// this expression; names it does not know are primitive fields. Cycles
    /// and empty composites are reported as configuration errors against
    /// `owner`.
    pub fn expand<'a>(
        &'a self,
        kind: EntityKind,
        owner: &str,
        lookup: &dyn Fn(&str) -> Option<&'a FieldExpr>,
    ) -> MetricsResult<Vec<PrimitiveTerm>> {
        let mut out = Vec::new();
        let mut stack = vec![owner.to_string()];
        expand_into(self, Sign::Add, kind, lookup, &mut stack, &mut out)?;
        Ok(out)
    }
}

fn expand_into<'a>(
    expr: &'a FieldExpr,
    sign: Sign,
    kind: EntityKind,
    lookup: &dyn Fn(&str) -> Option<&'a FieldExpr>,
    stack: &mut Vec<String>,
    out: &mut Vec<PrimitiveTerm>,
) -> MetricsResult<()> {
    let owner = stack.last().cloned().unwrap_or_default();
    match expr {
        FieldExpr::Direct(name) => {
            if name.trim().is_empty() {
                return Err(MetricsError::configuration(kind, owner, "empty field name"));
            }
            out.push(PrimitiveTerm {
                name: name.clone(),
                sign,
            });
        }
        FieldExpr::Composite(terms) => {
            if terms.is_empty() {
                return Err(MetricsError::configuration(
                    kind,
                    owner,
                    "composite expression has no terms",
                ));
            }
            for term in terms {
                let term_sign = sign.compose(term.sign);
                if stack.iter().any(|s| s == &term.term) {
                    let mut path = stack.join(" -> ");
                    path.push_str(" -> ");
                    path.push_str(&term.term);
                    return Err(MetricsError::configuration(
                        kind,
                        stack[0].clone(),
                        format!("composite expansion cycles through {}", path),
                    ));
                }
                match lookup(&term.term) {
                    Some(nested) => {
                        stack.push(term.term.clone());
                        expand_into(nested, term_sign, kind, lookup, stack, out)?;
                        stack.pop();
                    }
                    None => out.push(PrimitiveTerm {
                        name: term.term.clone(),
                        sign: term_sign,
                    }),
                }
            }
        }
    }
    Ok(())
}
