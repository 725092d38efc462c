//! Backward-compatibility policy for schema updates
//!
//! Consumes the change list produced by [`crate::diff`] and decides
//! whether an update to a stored schema revision can be accepted without
//! breaking previously stored data.
//!
//! Rejected: deleting a field (renames surface as a delete/add pair and
//! are therefore rejected too, until a rename primitive exists), and any
//! value change where the underlying type actually changed. Everything
//! else - metadata text, new fields, metadata-only value changes - is
//! accepted.

use thiserror::Error;

use crate::diff::{Change, ChangeKind, ChangePayload};
use crate::value::ValueType;

/// Reasons an update to a stored schema is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompatError {
    /// A field present in the stored schema is missing from the update
    #[error("cannot delete field {name:?} at {path:?}")]
    DeletedField { name: String, path: String },

    /// A field's value type changed
    #[error("cannot change value type from {from:?} to {to:?} on field {name:?} at {path:?}")]
    TypeChanged {
        from: ValueType,
        to: ValueType,
        name: String,
        path: String,
    },

    /// An array's element type changed
    #[error("cannot change element type from {from:?} to {to:?} on field {name:?} at {path:?}")]
    ElementTypeChanged {
        from: ValueType,
        to: ValueType,
        name: String,
        path: String,
    },
}

/// Check a single change against the compatibility policy.
pub fn check_schema_change(change: &Change) -> Result<(), CompatError> {
    match change.kind {
        ChangeKind::DeleteField => {
            let name = match &change.from {
                Some(ChangePayload::Field(field)) => field.name.clone(),
                _ => change.path.last().cloned().unwrap_or_default(),
            };
            Err(CompatError::DeletedField { name, path: change.path.join(".") })
        }
        ChangeKind::UpdateValue => {
            let (Some(ChangePayload::Value(from)), Some(ChangePayload::Value(to))) =
                (&change.from, &change.to)
            else {
                return Ok(());
            };
            if from.value_type() == to.value_type() {
                return Ok(());
            }
            // No type change is currently considered safe; widening support
            // waits on downstream storage layers tolerating it.
            if change.path.last().is_some_and(|p| p.as_str() == "*") {
                let (name, path) = split_path(&change.path[..change.path.len() - 1]);
                return Err(CompatError::ElementTypeChanged {
                    from: from.value_type(),
                    to: to.value_type(),
                    name,
                    path,
                });
            }
            let (name, path) = split_path(&change.path);
            Err(CompatError::TypeChanged {
                from: from.value_type(),
                to: to.value_type(),
                name,
                path,
            })
        }
        _ => Ok(()),
    }
}

/// Check a whole changelog; returns every violation found.
pub fn check_changelog(changes: &[Change]) -> Result<(), Vec<CompatError>> {
    let violations: Vec<CompatError> = changes
        .iter()
        .filter_map(|change| check_schema_change(change).err())
        .collect();
    if violations.is_empty() { Ok(()) } else { Err(violations) }
}

/// The backward-compatibility verdict for a changelog.
#[inline]
pub fn is_backward_compatible(changes: &[Change]) -> bool {
    changes.iter().all(|change| check_schema_change(change).is_ok())
}

fn split_path(path: &[String]) -> (String, String) {
    match path.split_last() {
        Some((last, rest)) => (last.clone(), rest.join(".")),
        None => (String::new(), String::new()),
    }
}
