use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};
use crate::model::schema::SchemaDescriptor;

/// Process-wide, read-only set of schema descriptors.
///
/// Built once from static configuration before the first request is
/// interpreted; shared freely across threads afterwards since nothing here
/// mutates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaDescriptor>,
}

impl SchemaRegistry {
    pub fn new(schemas: impl IntoIterator<Item = SchemaDescriptor>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|schema| (schema.name.clone(), schema))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Result<&SchemaDescriptor> {
        self.schemas
            .get(name)
            .ok_or_else(|| BuildError::UnknownSchema {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
