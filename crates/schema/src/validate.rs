//! Schema document validation
//!
//! Raw documents are checked against an embedded JSON meta-schema before
//! any resolution is attempted, so malformed documents are rejected with
//! actionable, multi-problem feedback instead of failing halfway through
//! the resolver or merge machinery.

use std::sync::LazyLock;

use jsonschema::Validator;

use crate::error::{Problem, Result, SchemaError};
use crate::value::Schema;

/// The structural contract for schema documents (JSON Schema draft-07).
const META_SCHEMA: &str = include_str!("schema.json");

/// Compiled once per process; the contract never changes at runtime.
static VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    let schema: serde_json::Value =
        serde_json::from_str(META_SCHEMA).expect("embedded meta-schema is valid JSON");
    jsonschema::validator_for(&schema).expect("embedded meta-schema compiles")
});

/// Validate a raw schema document against the meta-schema contract.
///
/// Returns every problem found, ordered by document location. Validation
/// never partially applies: on failure nothing has been resolved or
/// modified, and the caller can fix the document and resubmit.
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let doc = serde_json::to_value(schema)?;
    let mut problems: Vec<Problem> = VALIDATOR
        .iter_errors(&doc)
        .map(|err| Problem {
            path: err.instance_path.to_string(),
            message: err.to_string(),
        })
        .collect();
    if problems.is_empty() {
        return Ok(());
    }
    problems.sort();
    tracing::debug!(problems = problems.len(), "schema document failed validation");
    Err(SchemaError::validation(problems))
}
