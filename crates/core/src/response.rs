use serde::Serialize;

use crate::model::ScalarValue;
use crate::page::PageInfo;

/// Envelope for list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub status: u16,
    pub results: ListResults,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResults {
    pub data: Vec<serde_json::Value>,
    pub page_info: PageInfo,
    pub schema: String,
}

impl ListResponse {
    pub fn ok(schema: impl Into<String>, data: Vec<serde_json::Value>, page_info: PageInfo) -> Self {
        Self {
            status: 200,
            results: ListResults {
                data,
                page_info,
                schema: schema.into(),
            },
        }
    }
}

/// Envelope for single-record lookups.
#[derive(Debug, Clone, Serialize)]
pub struct RecordResponse {
    pub status: u16,
    pub results: RecordResults,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordResults {
    pub data: serde_json::Value,
    pub schema: String,
    pub id: ScalarValue,
}

impl RecordResponse {
    pub fn ok(schema: impl Into<String>, id: ScalarValue, data: serde_json::Value) -> Self {
        Self {
            status: 200,
            results: RecordResults {
                data,
                schema: schema.into(),
                id,
            },
        }
    }
}

/// Error envelope: a bare status, no data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
}

impl ErrorResponse {
    pub fn not_found() -> Self {
        Self { status: 404 }
    }

    pub fn internal_error() -> Self {
        Self { status: 500 }
    }
}
