//! Record compiler and decoder error types

use strata_schema::ValueType;
use thiserror::Error;

/// Errors that can occur while compiling a resolved schema into a record
/// descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The root of a record schema must be an object
    #[error("record root must be an object, got {found}")]
    NotAnObject { found: ValueType },

    /// An array with no element type cannot be decoded
    #[error("empty value schema at {path:?}")]
    EmptyValue { path: String },

    /// A field name with no alphanumeric characters leaves no identifier
    #[error("field name {name:?} at {path:?} leaves no identifier after sanitization")]
    EmptyFieldIdent { name: String, path: String },

    /// Two field names collide after sanitization
    #[error("fields {first:?} and {second:?} at {path:?} both sanitize to identifier {ident:?}")]
    DuplicateFieldIdent {
        ident: String,
        first: String,
        second: String,
        path: String,
    },

    /// The schema still contains an unresolved reference
    #[error("unresolved reference {target:?} at {path:?}; resolve the schema before compiling")]
    UnresolvedSchema { target: String, path: String },
}

impl CompileError {
    pub(crate) fn empty_value(path: &[String]) -> Self {
        Self::EmptyValue { path: path.join(".") }
    }

    pub(crate) fn unresolved(target: &str, path: &[String]) -> Self {
        Self::UnresolvedSchema {
            target: target.to_string(),
            path: path.join("."),
        }
    }
}

/// Errors that can occur while decoding a JSON log line against a record
/// descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input line is not a JSON object
    #[error("record line is not a JSON object")]
    NotAnObject,

    /// A required field is absent or null
    #[error("missing required field {path:?}")]
    MissingField { path: String },

    /// A value does not match its declared type
    #[error("field {path:?}: expected {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// A timestamp value does not parse under the field's codec
    #[error("field {path:?}: cannot decode timestamp {value:?} with codec {codec}")]
    BadTimestamp {
        path: String,
        value: String,
        codec: String,
    },
}

impl DecodeError {
    pub(crate) fn type_mismatch(
        path: &[String],
        expected: &'static str,
        found: &serde_json::Value,
    ) -> Self {
        Self::TypeMismatch {
            path: path.join("."),
            expected,
            found: kind_name(found).to_string(),
        }
    }

    pub(crate) fn bad_timestamp(
        path: &[String],
        value: &serde_json::Value,
        codec: impl std::fmt::Display,
    ) -> Self {
        Self::BadTimestamp {
            path: path.join("."),
            value: value.to_string(),
            codec: codec.to_string(),
        }
    }
}

fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
