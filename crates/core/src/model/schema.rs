use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One named association on a schema.
///
/// A direct edge carries the key pair needed to join it. A through edge is
/// a chain of other association names and is never joinable by itself; the
/// resolver expands it into direct hops before planning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssociationEdge {
    Direct {
        target_schema: String,
        owner_key: String,
        related_key: String,
        cardinality: Cardinality,
    },
    Through {
        chain: Vec<String>,
    },
}

/// A named relation: ordered fields plus its association edges.
///
/// Descriptors are built once at process start and shared read-only for the
/// life of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub name: String,
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub associations: BTreeMap<String, AssociationEdge>,
}

impl SchemaDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn association(&self, name: &str) -> Option<&AssociationEdge> {
        self.associations.get(name)
    }
}
