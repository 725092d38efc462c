//! Structural diffing of schema documents
//!
//! Computes an ordered, classified list of changes between two schema
//! versions. Document-level metadata and the parser directive are compared
//! first, then the resolved value trees are walked type-first: a type
//! change subsumes everything below it, so the walk stops descending at
//! that point.
//!
//! The change list feeds the backward-compatibility gate
//! ([`crate::check_schema_change`]) and the external versioned-registry
//! service.

use std::ops::ControlFlow;

use serde::Serialize;

use crate::error::Result;
use crate::resolve::resolve;
use crate::value::{indicator_set, FieldSchema, Parser, Schema, ValueSchema};

// =============================================================================
// Change model
// =============================================================================

/// The kind of a structural change between two schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    /// A field was added.
    AddField,
    /// A field was removed.
    DeleteField,
    /// A field's metadata changed (required, description).
    UpdateFieldMeta,
    /// A field's value type changed.
    UpdateValue,
    /// Metadata of a field's value type changed (timeFormat, isEventTime,
    /// indicators).
    UpdateValueMeta,
    /// The document's parser directive changed.
    UpdateParser,
    /// Document metadata changed (schema, description, referenceURL).
    UpdateMeta,
}

impl ChangeKind {
    /// Stable name of this change kind.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddField => "AddField",
            Self::DeleteField => "DeleteField",
            Self::UpdateFieldMeta => "UpdateFieldMeta",
            Self::UpdateValue => "UpdateValue",
            Self::UpdateValueMeta => "UpdateValueMeta",
            Self::UpdateParser => "UpdateParser",
            Self::UpdateMeta => "UpdateMeta",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a change; the shape depends on the change kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangePayload {
    /// A whole value schema (UpdateValue).
    Value(ValueSchema),
    /// A whole field (AddField, DeleteField).
    Field(FieldSchema),
    /// A parser directive (UpdateParser).
    Parser(Parser),
    /// An indicator set, sorted (UpdateValueMeta on strings).
    Indicators(Vec<String>),
    /// A text attribute (UpdateMeta, description changes).
    Text(String),
    /// A boolean attribute (required, isEventTime).
    Flag(bool),
}

/// One structural difference between two schema versions.
///
/// The path is the chain of field names from the document root, with `*`
/// denoting an array element and a trailing attribute name for metadata
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<ChangePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<ChangePayload>,
}

impl Change {
    fn meta(path: &[&str], kind: ChangeKind, from: ChangePayload, to: ChangePayload) -> Self {
        Self {
            kind,
            path: path.iter().map(|s| s.to_string()).collect(),
            from: Some(from),
            to: Some(to),
        }
    }
}

// =============================================================================
// Document diff
// =============================================================================

/// Resolve `from` and `to` and return the ordered changes needed to go
/// from one to the other.
pub fn diff(from: &Schema, to: &Schema) -> Result<Vec<Change>> {
    let value_from = resolve(from)?;
    let value_to = resolve(to)?;

    let mut changes = Vec::new();
    if from.name != to.name {
        changes.push(Change::meta(
            &["schema"],
            ChangeKind::UpdateMeta,
            ChangePayload::Text(from.name.clone()),
            ChangePayload::Text(to.name.clone()),
        ));
    }
    if from.description != to.description {
        changes.push(Change::meta(
            &["description"],
            ChangeKind::UpdateMeta,
            ChangePayload::Text(from.description.clone()),
            ChangePayload::Text(to.description.clone()),
        ));
    }
    if from.reference_url != to.reference_url {
        changes.push(Change::meta(
            &["referenceURL"],
            ChangeKind::UpdateMeta,
            ChangePayload::Text(from.reference_url.clone()),
            ChangePayload::Text(to.reference_url.clone()),
        ));
    }
    if from.parser != to.parser {
        changes.push(Change {
            kind: ChangeKind::UpdateParser,
            path: vec!["parser".to_string()],
            from: from.parser.clone().map(ChangePayload::Parser),
            to: to.parser.clone().map(ChangePayload::Parser),
        });
    }

    diff_walk(&value_from, &value_to, &["fields"], &mut |change| {
        changes.push(change);
        ControlFlow::Continue(())
    });
    Ok(changes)
}

/// Walk two resolved value trees and invoke `walk` for every change found.
///
/// `base_path` is prepended to the path of each emitted change. The
/// callback can stop the walk early by returning [`ControlFlow::Break`].
pub fn diff_walk<F>(from: &ValueSchema, to: &ValueSchema, base_path: &[&str], walk: &mut F)
where
    F: FnMut(Change) -> ControlFlow<()>,
{
    let mut path: Vec<String> = base_path.iter().map(|s| s.to_string()).collect();
    let _ = walk_value(from, to, &mut path, walk);
}

fn walk_value<F>(
    from: &ValueSchema,
    to: &ValueSchema,
    path: &mut Vec<String>,
    walk: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(Change) -> ControlFlow<()>,
{
    if from.value_type() != to.value_type() {
        // A type change subsumes all differences below it.
        return walk(Change {
            kind: ChangeKind::UpdateValue,
            path: path.clone(),
            from: Some(ChangePayload::Value(from.clone())),
            to: Some(ChangePayload::Value(to.clone())),
        });
    }
    use ValueSchema as V;
    match (from, to) {
        (V::Object { fields: fields_from }, V::Object { fields: fields_to }) => {
            walk_object(fields_from, fields_to, path, walk)
        }
        (V::Array { element: el_from }, V::Array { element: el_to }) => {
            match (el_from, el_to) {
                (Some(el_from), Some(el_to)) => {
                    path.push("*".to_string());
                    let flow = walk_value(el_from, el_to, path, walk);
                    path.pop();
                    flow
                }
                (None, None) => ControlFlow::Continue(()),
                // One side never established an element type.
                _ => {
                    path.push("*".to_string());
                    let change = Change {
                        kind: ChangeKind::UpdateValue,
                        path: path.clone(),
                        from: el_from.as_deref().cloned().map(ChangePayload::Value),
                        to: el_to.as_deref().cloned().map(ChangePayload::Value),
                    };
                    path.pop();
                    walk(change)
                }
            }
        }
        (
            V::Timestamp { time_format: fmt_from, is_event_time: evt_from },
            V::Timestamp { time_format: fmt_to, is_event_time: evt_to },
        ) => {
            if evt_from != evt_to {
                walk(attr_change(
                    path,
                    "isEventTime",
                    ChangePayload::Flag(*evt_from),
                    ChangePayload::Flag(*evt_to),
                ))?;
            }
            if fmt_from != fmt_to {
                walk(attr_change(
                    path,
                    "timeFormat",
                    ChangePayload::Text(fmt_from.clone()),
                    ChangePayload::Text(fmt_to.clone()),
                ))?;
            }
            ControlFlow::Continue(())
        }
        (V::String { indicators: ind_from }, V::String { indicators: ind_to }) => {
            let (set_from, set_to) = (indicator_set(ind_from), indicator_set(ind_to));
            if set_from != set_to {
                return walk(attr_change(
                    path,
                    "indicators",
                    ChangePayload::Indicators(set_from),
                    ChangePayload::Indicators(set_to),
                ));
            }
            ControlFlow::Continue(())
        }
        _ => ControlFlow::Continue(()),
    }
}

fn walk_object<F>(
    from: &[FieldSchema],
    to: &[FieldSchema],
    path: &mut Vec<String>,
    walk: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(Change) -> ControlFlow<()>,
{
    for pair in field_pairs(from, to) {
        match (pair.a, pair.b) {
            (Some(field_from), Some(field_to)) => {
                path.push(field_from.name.clone());
                let flow = walk_value(&field_from.value, &field_to.value, path, walk);
                path.pop();
                flow?;
                if field_from.required != field_to.required {
                    walk(field_attr_change(
                        path,
                        &field_from.name,
                        "required",
                        ChangePayload::Flag(field_from.required),
                        ChangePayload::Flag(field_to.required),
                    ))?;
                }
                if field_from.description != field_to.description {
                    walk(field_attr_change(
                        path,
                        &field_from.name,
                        "description",
                        ChangePayload::Text(field_from.description.clone()),
                        ChangePayload::Text(field_to.description.clone()),
                    ))?;
                }
            }
            (Some(deleted), None) => {
                walk(Change {
                    kind: ChangeKind::DeleteField,
                    path: path.clone(),
                    from: Some(ChangePayload::Field(deleted.clone())),
                    to: None,
                })?;
            }
            (None, Some(added)) => {
                walk(Change {
                    kind: ChangeKind::AddField,
                    path: path.clone(),
                    from: None,
                    to: Some(ChangePayload::Field(added.clone())),
                })?;
            }
            (None, None) => {}
        }
    }
    ControlFlow::Continue(())
}

fn attr_change(
    path: &[String],
    attr: &str,
    from: ChangePayload,
    to: ChangePayload,
) -> Change {
    let mut full = path.to_vec();
    full.push(attr.to_string());
    Change { kind: ChangeKind::UpdateValueMeta, path: full, from: Some(from), to: Some(to) }
}

fn field_attr_change(
    path: &[String],
    field: &str,
    attr: &str,
    from: ChangePayload,
    to: ChangePayload,
) -> Change {
    let mut full = path.to_vec();
    full.push(field.to_string());
    full.push(attr.to_string());
    Change { kind: ChangeKind::UpdateFieldMeta, path: full, from: Some(from), to: Some(to) }
}

// =============================================================================
// Field pairing
// =============================================================================

/// A pair of same-named fields from two field sets.
///
/// `a` and `b` are both set when the field exists on both sides; exactly
/// one is set when the field exists on only one side.
#[derive(Debug, Clone, Copy)]
pub struct FieldPair<'a> {
    pub a: Option<&'a FieldSchema>,
    pub b: Option<&'a FieldSchema>,
}

/// Pair two field sets by name: fields only in `a` first (in `a` order),
/// then fields only in `b`, then fields present in both.
///
/// Useful when operating on the union of two field sets without losing
/// track of which side each field came from; both the merge engine and the
/// object walk above are built on it.
pub fn field_pairs<'a>(a: &'a [FieldSchema], b: &'a [FieldSchema]) -> Vec<FieldPair<'a>> {
    let mut pairs = Vec::new();
    for field in a {
        if find_field(&field.name, b).is_none() {
            pairs.push(FieldPair { a: Some(field), b: None });
        }
    }
    for field in b {
        if find_field(&field.name, a).is_none() {
            pairs.push(FieldPair { a: None, b: Some(field) });
        }
    }
    for field in a {
        if let Some(other) = find_field(&field.name, b) {
            pairs.push(FieldPair { a: Some(field), b: Some(other) });
        }
    }
    pairs
}

fn find_field<'a>(name: &str, fields: &'a [FieldSchema]) -> Option<&'a FieldSchema> {
    fields.iter().find(|f| f.name == name)
}
