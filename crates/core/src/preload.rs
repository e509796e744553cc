use serde::Deserialize;

use crate::error::Result;
use crate::model::schema::SchemaDescriptor;
use crate::model::SchemaRegistry;
use crate::plan::BindingTable;
use crate::resolver::resolve_path;

/// One element of a preload tree: a bare association name, or a name with
/// nested preloads underneath it.
///
/// The preload walker itself is an external collaborator; the engine only
/// consumes these trees to learn which joins already exist, so filters and
/// sorts over the same paths reuse them instead of joining again.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PreloadSpec {
    Name(String),
    Nested(String, Vec<PreloadSpec>),
}

/// Flatten a preload tree into every association path it mentions, parents
/// before children.
pub fn paths(specs: &[PreloadSpec]) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    collect(specs, &mut Vec::new(), &mut out);
    out
}

fn collect(specs: &[PreloadSpec], prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for spec in specs {
        match spec {
            PreloadSpec::Name(name) => {
                prefix.push(name.clone());
                out.push(prefix.clone());
                prefix.pop();
            }
            PreloadSpec::Nested(name, children) => {
                prefix.push(name.clone());
                out.push(prefix.clone());
                collect(children, prefix, out);
                prefix.pop();
            }
        }
    }
}

/// Seed a binding table with every path of a preload tree.
pub fn seed_joins(
    registry: &SchemaRegistry,
    base: &SchemaDescriptor,
    specs: &[PreloadSpec],
    bindings: &mut BindingTable,
) -> Result<()> {
    for path in paths(specs) {
        let steps = resolve_path(registry, base, &path)?;
        bindings.ensure_joins(&steps)?;
    }
    Ok(())
}
