use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{BuildError, Result};
use crate::model::ScalarValue;

/// A decoded list request: raw filter values keyed by spec key, sort tokens
/// in request order, and the page window.
///
/// Keys that are present with a null value are distinct from absent keys;
/// the interpreter's phase selection depends on exactly that difference, so
/// the map keeps explicit nulls.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ListRequest {
    #[serde(default)]
    pub filters: BTreeMap<String, ScalarValue>,
    #[serde(default)]
    pub sort: Vec<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl ListRequest {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|error| BuildError::RequestDecodeFailure {
            detail: error.to_string(),
        })
    }

    pub fn from_json_str(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|error| BuildError::RequestDecodeFailure {
            detail: error.to_string(),
        })
    }
}
