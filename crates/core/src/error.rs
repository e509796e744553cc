use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors raised while turning a request into a query plan.
///
/// Every variant is terminal for the current request; nothing here is
/// retried. Unknown names and depth overruns are caller misconfiguration,
/// the rest is bad request input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("schema '{name}' is not registered")]
    UnknownSchema { name: String },

    #[error("association '{name}' not found on schema '{schema}'")]
    UnknownAssociation { name: String, schema: String },

    #[error("field '{field}' not found on schema '{schema}'")]
    UnknownField { field: String, schema: String },

    #[error("association chain reaches depth {depth}, the maximum supported depth is {max}")]
    UnsupportedDepth { depth: usize, max: usize },

    #[error("operator '{operator}' cannot be applied to a null value for field '{field}'")]
    InvalidNullComparison { field: String, operator: String },

    #[error("sort token '{token}' is malformed: {reason}")]
    MalformedSortToken { token: String, reason: String },

    #[error("request payload could not be decoded: {detail}")]
    RequestDecodeFailure { detail: String },

    #[error("computed default '{capability}.{operation}' failed: {detail}")]
    ComputedDefaultFailure {
        capability: String,
        operation: String,
        detail: String,
    },

    #[error("through association '{name}' on schema '{schema}' expands back into itself")]
    CyclicAssociation { name: String, schema: String },

    #[error("spec list declares key '{key}' more than once")]
    DuplicateSpecKey { key: String },
}
