//! Schema document and value-type model
//!
//! These types mirror the wire format of schema documents (YAML or JSON).
//! A document declares an ordered list of top-level fields plus optional
//! named definitions; every value node is one of the variants of
//! [`ValueSchema`].
//!
//! All types are plain immutable data. Every engine transformation
//! (resolve, merge, diff, infer) returns a new tree and never mutates its
//! inputs, so resolved trees can be shared and cached freely.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// =============================================================================
// Value types
// =============================================================================

/// The type tag of a [`ValueSchema`] node.
///
/// `Ref` only appears in unresolved trees; resolution replaces every
/// reference with its target structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Object,
    Array,
    Timestamp,
    Ref,
    String,
    Boolean,
    Int16,
    Int32,
    Int64,
    Float64,
    Json,
}

impl ValueType {
    /// Wire name of this type, as it appears in schema documents.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::Timestamp => "timestamp",
            Self::Ref => "ref",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Json => "json",
        }
    }

    /// Check if this is a composite type (`object` or `array`)
    #[inline]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Value schema tree
// =============================================================================

/// A single node in a schema value tree.
///
/// Serialized as a `type` tag plus type-specific attributes, matching the
/// document wire format:
///
/// ```yaml
/// type: object
/// fields:
/// - name: remote_ip
///   type: string
///   indicators: [ip]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueSchema {
    /// An object with an ordered list of named fields.
    ///
    /// Field order is significant for deterministic output, not for
    /// semantics. Field names are unique within one object.
    Object {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<FieldSchema>,
    },

    /// An array with a single element type.
    ///
    /// The element is absent only in inferred trees built from empty
    /// samples; documents always declare it.
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        element: Option<Box<ValueSchema>>,
    },

    /// A timestamp with a decode format and an event-time marker.
    Timestamp {
        #[serde(rename = "timeFormat", default, skip_serializing_if = "String::is_empty")]
        time_format: String,
        #[serde(rename = "isEventTime", default, skip_serializing_if = "is_false")]
        is_event_time: bool,
    },

    /// A named reference to an entry in the document's `definitions` map.
    Ref { target: String },

    /// A string, optionally tagged with semantic indicators (ip, url, ...).
    String {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        indicators: Vec<String>,
    },

    Boolean,
    Int16,
    Int32,
    Int64,
    Float64,

    /// Untyped JSON payload; the universal fallback type.
    Json,
}

#[inline]
fn is_false(v: &bool) -> bool {
    !*v
}

impl ValueSchema {
    /// The type tag of this node.
    #[inline]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Object { .. } => ValueType::Object,
            Self::Array { .. } => ValueType::Array,
            Self::Timestamp { .. } => ValueType::Timestamp,
            Self::Ref { .. } => ValueType::Ref,
            Self::String { .. } => ValueType::String,
            Self::Boolean => ValueType::Boolean,
            Self::Int16 => ValueType::Int16,
            Self::Int32 => ValueType::Int32,
            Self::Int64 => ValueType::Int64,
            Self::Float64 => ValueType::Float64,
            Self::Json => ValueType::Json,
        }
    }

    /// Check if this node is a composite (`object` or `array`)
    #[inline]
    pub const fn is_composite(&self) -> bool {
        self.value_type().is_composite()
    }

    /// A plain string with no indicators.
    pub const fn string() -> Self {
        Self::String { indicators: Vec::new() }
    }

    /// A string tagged with semantic indicators.
    pub fn string_with(indicators: &[&str]) -> Self {
        Self::String {
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// An object with the given fields.
    pub fn object(fields: Vec<FieldSchema>) -> Self {
        Self::Object { fields }
    }

    /// An array of the given element type.
    pub fn array(element: ValueSchema) -> Self {
        Self::Array { element: Some(Box::new(element)) }
    }

    /// An array with no established element type.
    pub const fn empty_array() -> Self {
        Self::Array { element: None }
    }

    /// A timestamp with the given decode format.
    pub fn timestamp(time_format: &str) -> Self {
        Self::Timestamp {
            time_format: time_format.to_string(),
            is_event_time: false,
        }
    }

    /// A timestamp marked as the record's event time.
    pub fn event_timestamp(time_format: &str) -> Self {
        Self::Timestamp {
            time_format: time_format.to_string(),
            is_event_time: true,
        }
    }

    /// A reference to a named definition.
    pub fn reference(target: &str) -> Self {
        Self::Ref { target: target.to_string() }
    }
}

/// Normalize an indicator list to a sorted, deduplicated set.
///
/// Indicator comparison is order-insensitive everywhere in the engine.
pub(crate) fn indicator_set(indicators: &[String]) -> Vec<String> {
    indicators
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// =============================================================================
// Fields and documents
// =============================================================================

/// A named field inside an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(flatten)]
    pub value: ValueSchema,
}

impl FieldSchema {
    /// An optional field with no description.
    pub fn new(name: impl Into<String>, value: ValueSchema) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: String::new(),
            value,
        }
    }

    /// Mark the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A top-level schema document.
///
/// Authored externally (hand-written or produced by inference), validated
/// once, resolved once, and treated as a value from then on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Log type name, e.g. `ApacheAccess`.
    #[serde(rename = "schema", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<Parser>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "referenceURL", default, skip_serializing_if = "String::is_empty")]
    pub reference_url: String,
    /// Format version of the document itself (currently pinned to 0).
    pub version: u32,
    /// Named value schemas usable as `ref` targets. Only meaningful before
    /// resolution. Keyed in sorted order so resolution is deterministic.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, ValueSchema>,
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    /// Parse a schema document from YAML.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a schema document from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// =============================================================================
// Parser selection directive
// =============================================================================

/// Selects which raw-text tokenizer the preprocessing layer should run
/// before schema-driven decoding. Exactly one variant is set.
///
/// The engine treats this as opaque configuration: it is validated against
/// the meta-schema and compared by the diff engine, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvParser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastmatch: Option<FastMatchParser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexParser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<NativeParser>,
}

/// CSV tokenizer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvParser {
    #[serde(rename = "hasHeader", default, skip_serializing_if = "is_false")]
    pub has_header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(rename = "skipPrefix", default, skip_serializing_if = "Option::is_none")]
    pub skip_prefix: Option<String>,
    #[serde(rename = "emptyValues", default, skip_serializing_if = "Vec::is_empty")]
    pub empty_values: Vec<String>,
    #[serde(rename = "trimSpace", default, skip_serializing_if = "is_false")]
    pub trim_space: bool,
    #[serde(rename = "expandFields", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expand_fields: BTreeMap<String, String>,
}

/// Fast pattern-match tokenizer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastMatchParser {
    #[serde(rename = "match")]
    pub patterns: Vec<String>,
    #[serde(rename = "skipPrefix", default, skip_serializing_if = "Option::is_none")]
    pub skip_prefix: Option<String>,
    #[serde(rename = "emptyValues", default, skip_serializing_if = "Vec::is_empty")]
    pub empty_values: Vec<String>,
    #[serde(rename = "trimSpace", default, skip_serializing_if = "is_false")]
    pub trim_space: bool,
    #[serde(rename = "expandFields", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expand_fields: BTreeMap<String, String>,
}

/// Regular-expression tokenizer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegexParser {
    #[serde(rename = "patternDefinitions", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pattern_definitions: BTreeMap<String, String>,
    #[serde(rename = "match")]
    pub patterns: Vec<String>,
    #[serde(rename = "skipPrefix", default, skip_serializing_if = "Option::is_none")]
    pub skip_prefix: Option<String>,
    #[serde(rename = "emptyValues", default, skip_serializing_if = "Vec::is_empty")]
    pub empty_values: Vec<String>,
    #[serde(rename = "trimSpace", default, skip_serializing_if = "is_false")]
    pub trim_space: bool,
    #[serde(rename = "expandFields", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expand_fields: BTreeMap<String, String>,
}

/// Built-in tokenizer selected by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeParser {
    pub name: String,
}

// =============================================================================
// Time formats
// =============================================================================

/// Well-known timestamp format codes.
///
/// Any other non-empty format string is treated as a custom strftime
/// pattern by the record compiler.
pub mod time_format {
    pub const RFC3339: &str = "rfc3339";
    pub const UNIX: &str = "unix";
    pub const UNIX_MS: &str = "unix_ms";
    pub const UNIX_US: &str = "unix_us";
    pub const UNIX_NS: &str = "unix_ns";

    /// Check if a format code is one of the numeric unix-epoch family.
    #[inline]
    pub fn is_unix_family(format: &str) -> bool {
        matches!(format, UNIX | UNIX_MS | UNIX_US | UNIX_NS)
    }
}
