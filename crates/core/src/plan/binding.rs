//! Join deduplication and alias/depth assignment.
//!
//! Joined association paths are runtime-addressable rows in a binding
//! table rather than positionally-named bindings, so one builder handles
//! every depth up to the ceiling.

use serde::Serialize;
use tracing::debug;

use crate::error::{BuildError, Result};
use crate::resolver::JoinStep;

/// Deepest association chain a single plan may join.
pub const MAX_BINDING_DEPTH: usize = 21;

const ALIAS_SEPARATOR: char = '_';

/// One joined association path.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BindingEntry {
    pub alias: String,
    pub association_name: String,
    pub schema: String,
    pub owner_key: String,
    pub related_key: String,
    /// Depth of the relation the owner key lives on; 0 is the base.
    pub parent_depth: usize,
}

/// Ordered, deduplicated join list. Depths are 1-based table positions and
/// follow join order exactly; requesting the same path twice yields the
/// same depth.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BindingTable {
    entries: Vec<BindingEntry>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[BindingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based depth of an alias, if that path is already joined.
    pub fn depth_of(&self, alias: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.alias == alias)
            .map(|index| index + 1)
    }

    pub fn entry(&self, depth: usize) -> Option<&BindingEntry> {
        depth.checked_sub(1).and_then(|index| self.entries.get(index))
    }

    /// Merge a resolved step chain into the table and return the depth of
    /// the chain's last step (0 when the chain is empty).
    ///
    /// Steps already present by alias are reused; a chain that would push
    /// the table past [`MAX_BINDING_DEPTH`] fails rather than truncate.
    pub fn ensure_joins(&mut self, steps: &[JoinStep]) -> Result<usize> {
        let mut parent_alias: Option<String> = None;
        let mut parent_depth = 0usize;

        for step in steps {
            let alias = match &parent_alias {
                None => step.association_name.clone(),
                Some(parent) => {
                    format!("{parent}{ALIAS_SEPARATOR}{}", step.association_name)
                }
            };

            let depth = match self.depth_of(&alias) {
                Some(existing) => existing,
                None => {
                    if self.entries.len() >= MAX_BINDING_DEPTH {
                        return Err(BuildError::UnsupportedDepth {
                            depth: self.entries.len() + 1,
                            max: MAX_BINDING_DEPTH,
                        });
                    }
                    self.entries.push(BindingEntry {
                        alias: alias.clone(),
                        association_name: step.association_name.clone(),
                        schema: step.target_schema.clone(),
                        owner_key: step.owner_key.clone(),
                        related_key: step.related_key.clone(),
                        parent_depth,
                    });
                    debug!(alias = %alias, depth = self.entries.len(), "join added");
                    self.entries.len()
                }
            };

            parent_alias = Some(alias);
            parent_depth = depth;
        }

        Ok(parent_depth)
    }
}
