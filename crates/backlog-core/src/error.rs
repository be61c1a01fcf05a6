//! Error types for backlog-tools.

use thiserror::Error;

/// Main error type for Backlog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// API key rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Access denied (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response or input data is unusable
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Custom field decoding or resolution failed
    #[error("Custom field error: {0}")]
    Field(#[from] FieldError),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map a non-success HTTP status and response body to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Error::Unauthorized(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }
}

/// Errors raised by the custom-field codec, schema resolver, and
/// update-parameter builder.
///
/// Every variant names the field (and item, where relevant) that triggered it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The wire value does not have the shape its type tag requires.
    #[error("cannot decode custom field '{name}': {reason}")]
    Decode { name: String, reason: String },

    /// The type tag is not one of the known field types.
    #[error("custom field '{name}' has unknown field type id {type_id}")]
    UnknownFieldType { name: String, type_id: i64 },

    /// Two or more fields share a name.
    #[error("custom field name '{0}' is ambiguous")]
    AmbiguousName(String),

    /// Two or more list items of one field share a label.
    #[error("item '{item}' of custom field '{field}' is ambiguous")]
    AmbiguousItem { field: String, item: String },

    /// No field definition matches the name.
    #[error("custom field '{0}' not found")]
    FieldNotFound(String),

    /// The field exists but has no list item with the label.
    #[error("item '{item}' not found in custom field '{field}'")]
    ItemNotFound { field: String, item: String },

    /// The in-memory value does not match the shape of the field type.
    #[error("invalid value for custom field '{name}': expected {expected}")]
    InvalidValue { name: String, expected: &'static str },

    /// Resolution of a field against the schema failed.
    #[error("resolve field '{name}' failed: {source}")]
    Resolve {
        name: String,
        #[source]
        source: Box<FieldError>,
    },
}

impl FieldError {
    /// Wrap this error with the name of the field being resolved.
    pub fn resolving(self, name: impl Into<String>) -> Self {
        FieldError::Resolve {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any `Resolve` wrappers.
    pub fn root(&self) -> &FieldError {
        match self {
            FieldError::Resolve { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for Backlog operations.
pub type Result<T> = std::result::Result<T, Error>;
