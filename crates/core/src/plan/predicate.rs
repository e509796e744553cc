use serde::Serialize;

use crate::error::{BuildError, Result};
use crate::model::{CompareOp, ScalarValue};
use crate::plan::binding::MAX_BINDING_DEPTH;

/// A comparison against one relation of the plan: depth 0 is the base,
/// depth N is the binding table entry at position N.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Predicate {
    pub depth: usize,
    pub field: String,
    pub op: CompareOp,
    pub value: ScalarValue,
}

/// Build a predicate, normalizing null semantics:
///
/// - equality against null is a nullness test, so `eq`/`not_eq` with a null
///   value rewrite to `is_nil`/`not_nil`;
/// - ordering and set operators reject null values outright;
/// - nullness operators carry no operand, their value is canonicalized to
///   null so equivalent predicates compare equal.
pub fn build_predicate(
    depth: usize,
    field: &str,
    op: CompareOp,
    value: ScalarValue,
) -> Result<Predicate> {
    if depth > MAX_BINDING_DEPTH {
        return Err(BuildError::UnsupportedDepth {
            depth,
            max: MAX_BINDING_DEPTH,
        });
    }

    let op = if value.is_null() {
        match op {
            CompareOp::Eq => CompareOp::IsNil,
            CompareOp::NotEq => CompareOp::NotNil,
            CompareOp::IsNil | CompareOp::NotNil => op,
            other => {
                return Err(BuildError::InvalidNullComparison {
                    field: field.to_string(),
                    operator: other.to_string(),
                });
            }
        }
    } else {
        op
    };

    let value = if op.is_nullness() {
        ScalarValue::Null
    } else {
        value
    };

    Ok(Predicate {
        depth,
        field: field.to_string(),
        op,
        value,
    })
}
