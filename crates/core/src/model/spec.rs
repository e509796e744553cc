use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::model::value::ScalarValue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    IsNil,
    NotNil,
}

impl CompareOp {
    /// Operators that test nullness directly and therefore accept a null
    /// value operand.
    pub fn is_nullness(self) -> bool {
        matches!(self, CompareOp::IsNil | CompareOp::NotNil)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompareOp::Eq => "eq",
            CompareOp::NotEq => "not_eq",
            CompareOp::Gt => "gt",
            CompareOp::Lt => "lt",
            CompareOp::Gte => "gte",
            CompareOp::Lte => "lte",
            CompareOp::In => "in",
            CompareOp::NotIn => "not_in",
            CompareOp::IsNil => "is_nil",
            CompareOp::NotNil => "not_nil",
        };
        f.write_str(name)
    }
}

/// The operator a filter spec declares: either a fixed operator, or a pair
/// selected by the truthiness of the filter value at interpretation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OperatorSpec {
    Simple(CompareOp),
    Conditional { truthy: CompareOp, falsy: CompareOp },
}

impl OperatorSpec {
    /// Select the concrete operator for a value. A conditional pair never
    /// reaches predicate construction unresolved.
    pub fn select(self, value: &ScalarValue) -> CompareOp {
        match self {
            OperatorSpec::Simple(op) => op,
            OperatorSpec::Conditional { truthy, falsy } => {
                if value.is_truthy() {
                    truthy
                } else {
                    falsy
                }
            }
        }
    }

    /// The operator used when a filter applies with no driving value
    /// (allow-nil application): the truthy branch of a pair.
    pub fn base(self) -> CompareOp {
        match self {
            OperatorSpec::Simple(op) => op,
            OperatorSpec::Conditional { truthy, .. } => truthy,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    #[default]
    None,
    Literal(ScalarValue),
    Computed {
        capability: String,
        operation: String,
        #[serde(default)]
        args: Vec<ScalarValue>,
    },
}

/// Declares one filterable key: which field it reaches (possibly across an
/// association path), with which operator, and what happens when the
/// request leaves the key out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterSpec {
    pub key: String,
    #[serde(default)]
    pub path: Vec<String>,
    pub field: String,
    pub operator: OperatorSpec,
    #[serde(default)]
    pub allow_nil: bool,
    #[serde(default)]
    pub default: DefaultValue,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub path: Vec<String>,
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub is_default: bool,
}

/// Validated filter and sort specs for one endpoint.
///
/// Keys must be unique within each list; a clash is rejected here rather
/// than silently resolved by first match.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecList {
    filters: Vec<FilterSpec>,
    sorts: Vec<SortSpec>,
}

impl SpecList {
    pub fn new(filters: Vec<FilterSpec>, sorts: Vec<SortSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in &filters {
            if !seen.insert(spec.key.as_str()) {
                return Err(BuildError::DuplicateSpecKey {
                    key: spec.key.clone(),
                });
            }
        }
        seen.clear();
        for spec in &sorts {
            if !seen.insert(spec.key.as_str()) {
                return Err(BuildError::DuplicateSpecKey {
                    key: spec.key.clone(),
                });
            }
        }
        Ok(Self { filters, sorts })
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn sorts(&self) -> &[SortSpec] {
        &self.sorts
    }

    pub fn sort(&self, key: &str) -> Option<&SortSpec> {
        self.sorts.iter().find(|spec| spec.key == key)
    }
}
