//! Core types, configuration, and error handling for backlog-tools.
//!
//! The [`field`] module holds the custom-field type system: decoding the
//! tagged wire values found on issues, resolving names against a project's
//! field schema, and building the form parameters for issue updates.

pub mod config;
pub mod error;
pub mod field;

pub use error::{Error, FieldError, Result};
pub use field::{
    build_update_params, CustomFieldCollection, FieldDefinition, FieldSchemaCatalog, FieldType,
    FieldValue, FormParams, ListItem, Value,
};
