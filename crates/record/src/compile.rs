//! Record-type compilation
//!
//! Turns a resolved value tree into an ordered field-descriptor list that
//! drives the generic JSON decoder ([`RecordType::decode`]). No per-schema
//! code is generated: one descriptor interpreter handles every schema, so
//! a schema update never needs a compile step.

use serde::Serialize;
use strata_schema::{time_format, FieldSchema, ValueSchema};

use crate::error::CompileError;

// =============================================================================
// Descriptors
// =============================================================================

/// A compiled record type: the ordered descriptors of an object schema's
/// fields.
///
/// Immutable and reusable across any number of concurrent decode calls;
/// compile once per schema, then share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordType {
    pub fields: Vec<FieldDescriptor>,
}

impl RecordType {
    /// Index of the field with the given JSON name.
    pub fn field_index(&self, json_name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.json_name == json_name)
    }
}

/// Everything the generic decoder needs to know about one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Decode-safe identifier derived from the field name.
    pub ident: String,
    /// The field name as it appears in the JSON input.
    pub json_name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub value: ValueKind,
}

/// The decode directive for one value position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValueKind {
    String {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        indicators: Vec<String>,
    },
    Timestamp {
        codec: TimeCodec,
        #[serde(rename = "isEventTime")]
        is_event_time: bool,
    },
    Bool,
    Int16,
    Int32,
    Int64,
    Float64,
    /// Raw JSON passthrough.
    Json,
    Array {
        element: Box<ValueKind>,
    },
    Object {
        fields: Vec<FieldDescriptor>,
    },
}

/// Timestamp decode codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeCodec {
    Rfc3339,
    UnixSeconds,
    UnixMillis,
    UnixMicros,
    UnixNanos,
    /// A custom strftime-style pattern.
    Strftime(String),
}

impl TimeCodec {
    /// Map a schema time-format code to its codec.
    ///
    /// An empty format defaults to RFC3339; any unrecognized code is
    /// treated as a custom strftime pattern.
    pub fn from_format(format: &str) -> Self {
        match format {
            "" | time_format::RFC3339 => Self::Rfc3339,
            time_format::UNIX => Self::UnixSeconds,
            time_format::UNIX_MS => Self::UnixMillis,
            time_format::UNIX_US => Self::UnixMicros,
            time_format::UNIX_NS => Self::UnixNanos,
            pattern => Self::Strftime(pattern.to_string()),
        }
    }

    /// Stable name of this codec.
    pub fn name(&self) -> String {
        match self {
            Self::Rfc3339 => time_format::RFC3339.to_string(),
            Self::UnixSeconds => time_format::UNIX.to_string(),
            Self::UnixMillis => time_format::UNIX_MS.to_string(),
            Self::UnixMicros => time_format::UNIX_US.to_string(),
            Self::UnixNanos => time_format::UNIX_NS.to_string(),
            Self::Strftime(pattern) => format!("strftime={pattern}"),
        }
    }
}

impl std::fmt::Display for TimeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for TimeCodec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

// =============================================================================
// Compilation
// =============================================================================

/// Compile a resolved object schema into a record type.
pub fn compile(schema: &ValueSchema) -> Result<RecordType, CompileError> {
    let ValueSchema::Object { fields } = schema else {
        return Err(CompileError::NotAnObject { found: schema.value_type() });
    };
    let mut path = Vec::new();
    let fields = compile_fields(fields, &mut path)?;
    tracing::debug!(fields = fields.len(), "compiled record type");
    Ok(RecordType { fields })
}

fn compile_fields(
    fields: &[FieldSchema],
    path: &mut Vec<String>,
) -> Result<Vec<FieldDescriptor>, CompileError> {
    let mut descriptors: Vec<FieldDescriptor> = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = sanitize_ident(&field.name).ok_or_else(|| CompileError::EmptyFieldIdent {
            name: field.name.clone(),
            path: path.join("."),
        })?;
        if let Some(prev) = descriptors.iter().find(|d| d.ident == ident) {
            return Err(CompileError::DuplicateFieldIdent {
                ident,
                first: prev.json_name.clone(),
                second: field.name.clone(),
                path: path.join("."),
            });
        }
        path.push(field.name.clone());
        let value = compile_value(&field.value, path)?;
        path.pop();
        descriptors.push(FieldDescriptor {
            ident,
            json_name: field.name.clone(),
            required: field.required,
            description: normalize_space(&field.description),
            value,
        });
    }
    Ok(descriptors)
}

fn compile_value(value: &ValueSchema, path: &mut Vec<String>) -> Result<ValueKind, CompileError> {
    match value {
        ValueSchema::Object { fields } => Ok(ValueKind::Object {
            fields: compile_fields(fields, path)?,
        }),
        ValueSchema::Array { element } => {
            let Some(element) = element else {
                return Err(CompileError::empty_value(path));
            };
            path.push("*".to_string());
            let element = compile_value(element, path)?;
            path.pop();
            Ok(ValueKind::Array { element: Box::new(element) })
        }
        ValueSchema::String { indicators } => Ok(ValueKind::String {
            indicators: indicators.clone(),
        }),
        ValueSchema::Timestamp { time_format, is_event_time } => Ok(ValueKind::Timestamp {
            codec: TimeCodec::from_format(time_format),
            is_event_time: *is_event_time,
        }),
        ValueSchema::Ref { target } => Err(CompileError::unresolved(target, path)),
        ValueSchema::Boolean => Ok(ValueKind::Bool),
        ValueSchema::Int16 => Ok(ValueKind::Int16),
        ValueSchema::Int32 => Ok(ValueKind::Int32),
        ValueSchema::Int64 => Ok(ValueKind::Int64),
        ValueSchema::Float64 => Ok(ValueKind::Float64),
        ValueSchema::Json => Ok(ValueKind::Json),
    }
}

/// Derive a decode-safe identifier from a schema field name: drop
/// characters outside `[A-Za-z0-9_]`, trim leading underscores, and prefix
/// a digit-leading result with `Field_`.
///
/// Returns `None` when nothing survives.
fn sanitize_ident(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let trimmed = cleaned.trim_start_matches('_');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(format!("Field_{trimmed}"));
    }
    Some(trimmed.to_string())
}

/// Collapse a multi-line description into one line of space-separated text.
fn normalize_space(input: &str) -> String {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
