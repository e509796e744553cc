use serde::Serialize;

use crate::plan::binding::BindingTable;
use crate::plan::order::OrderTerm;
use crate::plan::predicate::Predicate;

/// The finished product of interpretation: base relation, deduplicated
/// joins, predicates, and effective sort, in application order.
///
/// A plan is a value handed to the executor and discarded; it is never
/// mutated after assembly. A new request always builds a new plan.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryPlan {
    pub base_schema: String,
    pub bindings: BindingTable,
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderTerm>,
}

impl QueryPlan {
    pub fn new(
        base_schema: impl Into<String>,
        bindings: BindingTable,
        predicates: Vec<Predicate>,
        order: Vec<OrderTerm>,
    ) -> Self {
        Self {
            base_schema: base_schema.into(),
            bindings,
            predicates,
            order,
        }
    }
}
