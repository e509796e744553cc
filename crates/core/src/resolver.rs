//! Association-path resolution against the schema registry.
//!
//! Walks a path of association names hop by hop, expanding through-edges
//! transitively into their underlying direct hops, and produces the ordered
//! join steps the planner turns into bindings.

use serde::Serialize;

use crate::error::{BuildError, Result};
use crate::model::schema::{AssociationEdge, SchemaDescriptor};
use crate::model::SchemaRegistry;

/// One direct join hop produced by path resolution.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JoinStep {
    pub association_name: String,
    pub target_schema: String,
    pub owner_key: String,
    pub related_key: String,
}

/// Resolve an association-name path to its ordered direct join steps.
///
/// An empty path resolves to no steps: the filter or sort applies to the
/// base relation itself. An unknown name at any hop is fatal, as is a
/// through-chain that expands back into itself.
pub fn resolve_path(
    registry: &SchemaRegistry,
    base: &SchemaDescriptor,
    path: &[String],
) -> Result<Vec<JoinStep>> {
    let mut steps = Vec::new();
    let mut current = registry.get(&base.name)?;
    let mut expanding = Vec::new();
    for name in path {
        current = expand_association(registry, current, name, &mut steps, &mut expanding)?;
    }
    Ok(steps)
}

/// The schema a resolved path lands on: the last step's target, or the base
/// relation when the path was empty.
pub fn target_schema<'a>(
    registry: &'a SchemaRegistry,
    base: &'a SchemaDescriptor,
    steps: &[JoinStep],
) -> Result<&'a SchemaDescriptor> {
    match steps.last() {
        Some(step) => registry.get(&step.target_schema),
        None => registry.get(&base.name),
    }
}

fn expand_association<'a>(
    registry: &'a SchemaRegistry,
    schema: &'a SchemaDescriptor,
    name: &str,
    steps: &mut Vec<JoinStep>,
    expanding: &mut Vec<(String, String)>,
) -> Result<&'a SchemaDescriptor> {
    let edge = schema
        .association(name)
        .ok_or_else(|| BuildError::UnknownAssociation {
            name: name.to_string(),
            schema: schema.name.clone(),
        })?;

    match edge {
        AssociationEdge::Direct {
            target_schema,
            owner_key,
            related_key,
            ..
        } => {
            steps.push(JoinStep {
                association_name: name.to_string(),
                target_schema: target_schema.clone(),
                owner_key: owner_key.clone(),
                related_key: related_key.clone(),
            });
            registry.get(target_schema)
        }
        AssociationEdge::Through { chain } => {
            // An empty chain expands to nothing joinable.
            if chain.is_empty() {
                return Err(BuildError::UnknownAssociation {
                    name: name.to_string(),
                    schema: schema.name.clone(),
                });
            }
            let marker = (schema.name.clone(), name.to_string());
            if expanding.contains(&marker) {
                return Err(BuildError::CyclicAssociation {
                    name: name.to_string(),
                    schema: schema.name.clone(),
                });
            }
            expanding.push(marker);
            let mut current = schema;
            for hop in chain {
                current = expand_association(registry, current, hop, steps, expanding)?;
            }
            expanding.pop();
            Ok(current)
        }
    }
}
