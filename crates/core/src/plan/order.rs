use serde::Serialize;

use crate::error::{BuildError, Result};
use crate::model::SortDirection;
use crate::plan::binding::MAX_BINDING_DEPTH;

/// One ordering term of the effective sort.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderTerm {
    pub depth: usize,
    pub field: String,
    pub direction: SortDirection,
}

pub fn build_order_term(depth: usize, field: &str, direction: SortDirection) -> Result<OrderTerm> {
    if depth > MAX_BINDING_DEPTH {
        return Err(BuildError::UnsupportedDepth {
            depth,
            max: MAX_BINDING_DEPTH,
        });
    }
    Ok(OrderTerm {
        depth,
        field: field.to_string(),
        direction,
    })
}
