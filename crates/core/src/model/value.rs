use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BuildError;

/// A filter, sort, or default value carried through spec interpretation.
///
/// Request payloads only ever decode into the JSON scalar shapes; the date
/// and timestamp variants exist for programmatically built specs and for
/// computed defaults (a capability returning "now", for instance).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    List(Vec<ScalarValue>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Truthiness drives conditional-operator selection: only null and
    /// `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, ScalarValue::Null | ScalarValue::Bool(false))
    }

    /// Convert a decoded JSON value. Objects are not representable as
    /// filter values and are rejected.
    pub fn from_json(value: &serde_json::Value) -> crate::error::Result<Self> {
        match value {
            serde_json::Value::Null => Ok(ScalarValue::Null),
            serde_json::Value::Bool(flag) => Ok(ScalarValue::Bool(*flag)),
            serde_json::Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Ok(ScalarValue::Int(integer))
                } else if let Some(float) = number.as_f64() {
                    Ok(ScalarValue::Float(float))
                } else {
                    Err(BuildError::RequestDecodeFailure {
                        detail: format!("numeric value '{number}' is out of range"),
                    })
                }
            }
            serde_json::Value::String(text) => Ok(ScalarValue::String(text.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(ScalarValue::from_json)
                .collect::<crate::error::Result<Vec<_>>>()
                .map(ScalarValue::List),
            serde_json::Value::Object(_) => Err(BuildError::RequestDecodeFailure {
                detail: "object values are not supported in filters".to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        ScalarValue::from_json(&raw).map_err(serde::de::Error::custom)
    }
}
