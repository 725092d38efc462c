//! Reference resolution
//!
//! Expands every `ref` node in a schema document into the structure of its
//! target definition, producing a self-contained value tree. Resolution
//! tracks the chain of visited definition names so cyclic references are
//! reported with the offending chain instead of recursing unboundedly, and
//! caps nesting depth so a hostile document cannot overflow the stack.

use std::collections::BTreeMap;

use crate::error::{Result, SchemaError};
use crate::value::{FieldSchema, Schema, ValueSchema};

/// Maximum nesting depth for a resolved value tree.
pub const MAX_DEPTH: usize = 64;

/// Path marker for an array element level.
const ELEMENT_MARKER: &str = "[]";

/// Resolve all named references in a schema document.
///
/// Returns a new object tree with every `ref` replaced by its target's
/// structure. Fails if a reference cannot be resolved, if a reference
/// chain is cyclic, or if the nesting depth exceeds [`MAX_DEPTH`].
/// Resolving the same document twice yields structurally identical trees.
pub fn resolve(schema: &Schema) -> Result<ValueSchema> {
    let root = ValueSchema::object(schema.fields.clone());
    let mut path = Vec::with_capacity(MAX_DEPTH);
    let mut visited = Vec::new();
    let resolved = build(&root, &schema.definitions, &mut path, &mut visited)?;
    tracing::trace!(schema = %schema.name, "resolved schema document");
    Ok(resolved)
}

fn build(
    input: &ValueSchema,
    definitions: &BTreeMap<String, ValueSchema>,
    path: &mut Vec<String>,
    visited: &mut Vec<String>,
) -> Result<ValueSchema> {
    match input {
        ValueSchema::Object { fields } => {
            if path.len() == MAX_DEPTH {
                return Err(SchemaError::max_depth(MAX_DEPTH, path));
            }
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                path.push(field.name.clone());
                let value = build(&field.value, definitions, path, visited)?;
                path.pop();
                out.push(FieldSchema {
                    name: field.name.clone(),
                    required: field.required,
                    description: field.description.clone(),
                    value,
                });
            }
            Ok(ValueSchema::Object { fields: out })
        }
        ValueSchema::Array { element } => {
            if path.len() == MAX_DEPTH {
                return Err(SchemaError::max_depth(MAX_DEPTH, path));
            }
            let element = match element {
                Some(el) => {
                    path.push(ELEMENT_MARKER.to_string());
                    let resolved = build(el, definitions, path, visited)?;
                    path.pop();
                    Some(Box::new(resolved))
                }
                None => None,
            };
            Ok(ValueSchema::Array { element })
        }
        ValueSchema::Ref { target } => {
            if target.is_empty() {
                return Err(SchemaError::empty_ref(path));
            }
            if let Some(cycle) = find_cycle(target, visited) {
                return Err(SchemaError::cyclic_reference(target, path, cycle));
            }
            let Some(definition) = definitions.get(target) else {
                return Err(SchemaError::unresolved_ref(target, path));
            };
            // The visited chain only extends along this reference; sibling
            // branches resolve against the shorter chain again.
            visited.push(target.clone());
            let resolved = build(definition, definitions, path, visited);
            visited.pop();
            resolved
        }
        // Terminal variants are copied through, stripped to the attributes
        // that survive resolution.
        ValueSchema::String { indicators } => Ok(ValueSchema::String {
            indicators: indicators.clone(),
        }),
        ValueSchema::Timestamp { time_format, is_event_time } => Ok(ValueSchema::Timestamp {
            time_format: time_format.clone(),
            is_event_time: *is_event_time,
        }),
        scalar => Ok(scalar.clone()),
    }
}

/// Return the tail of the visited chain starting at `target`, if the chain
/// already contains it.
fn find_cycle(target: &str, visited: &[String]) -> Option<Vec<String>> {
    visited
        .iter()
        .position(|name| name.as_str() == target)
        .map(|i| visited[i..].to_vec())
}
