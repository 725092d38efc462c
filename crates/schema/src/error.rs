//! Schema engine error types
//!
//! Every failure is returned as a value. Validation and resolution errors
//! are recoverable by the caller (fix the document and resubmit); only the
//! merge-on-unresolved-tree case panics, because it signals a caller bug
//! rather than bad user input.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for schema engine operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// A single validation problem, pointing at a document location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Problem {
    /// JSON-pointer style location inside the document
    pub path: String,
    /// Human-readable description of what is wrong there
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors that can occur while validating or resolving a schema document
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Document failed the meta-schema contract; always carries at least
    /// one problem
    #[error("schema validation failed with {} problems", .problems.len())]
    Validation {
        /// All problems found, ordered by document location
        problems: Vec<Problem>,
    },

    /// A `ref` names a definition that does not exist
    #[error("unresolved type reference {target:?} at {path:?}")]
    UnresolvedRef { target: String, path: String },

    /// A `ref` with an empty target name
    #[error("empty reference at {path:?}")]
    EmptyRef { path: String },

    /// A `ref` chain that loops back on itself
    #[error("cyclic reference {target:?} at {path:?}: {cycle:?}")]
    CyclicReference {
        target: String,
        path: String,
        /// The chain of definition names forming the cycle
        cycle: Vec<String>,
    },

    /// Resolution descended past the maximum nesting depth
    #[error("max nesting depth ({max}) exceeded at {path:?}")]
    MaxDepthExceeded { max: usize, path: String },

    /// The document could not be decoded at all
    #[error("failed to decode schema document: {0}")]
    Document(String),
}

impl SchemaError {
    /// Create a validation error from a list of problems.
    pub fn validation(problems: Vec<Problem>) -> Self {
        Self::Validation { problems }
    }

    /// Create an unresolved-reference error.
    pub fn unresolved_ref(target: &str, path: &[String]) -> Self {
        Self::UnresolvedRef {
            target: target.to_string(),
            path: path.join("."),
        }
    }

    /// Create an empty-reference error.
    pub fn empty_ref(path: &[String]) -> Self {
        Self::EmptyRef { path: path.join(".") }
    }

    /// Create a cyclic-reference error carrying the offending chain.
    pub fn cyclic_reference(target: &str, path: &[String], cycle: Vec<String>) -> Self {
        Self::CyclicReference {
            target: target.to_string(),
            path: path.join("."),
            cycle,
        }
    }

    /// Create a depth-exceeded error.
    pub fn max_depth(max: usize, path: &[String]) -> Self {
        Self::MaxDepthExceeded { max, path: path.join(".") }
    }

    /// The validation problems carried by this error, if any.
    ///
    /// Empty for every non-validation variant.
    pub fn validation_problems(&self) -> &[Problem] {
        match self {
            Self::Validation { problems } => problems,
            _ => &[],
        }
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Document(err.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Document(err.to_string())
    }
}
