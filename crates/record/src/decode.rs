//! Generic descriptor-driven record decoding
//!
//! One decode loop serves every schema: each JSON key is mapped to its
//! field descriptor by name and decoded per the descriptor's value kind.
//! Unknown keys are ignored - log sources routinely grow extra fields, and
//! rejecting them would drop otherwise healthy events. Required-field
//! presence is enforced after the pass.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::compile::{FieldDescriptor, RecordType, TimeCodec, ValueKind};
use crate::error::DecodeError;

// =============================================================================
// Decoded values
// =============================================================================

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    /// Raw JSON captured for `json`-typed fields.
    Json(Value),
    Array(Vec<FieldValue>),
    Object(Record),
}

impl FieldValue {
    /// The decoded timestamp, if this value is one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// A decoded record: one slot per field descriptor, in descriptor order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    values: Vec<Option<FieldValue>>,
    event_time: Option<DateTime<Utc>>,
}

impl Record {
    /// The decoded value at the given descriptor index, if present.
    pub fn value(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Number of field slots (present or not).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The record's event time, taken from the first timestamp field
    /// flagged as event time that decoded successfully.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        self.event_time
    }
}

// =============================================================================
// Decoding
// =============================================================================

impl RecordType {
    /// Decode one JSON log line against this record type.
    pub fn decode(&self, line: &Value) -> Result<Record, DecodeError> {
        let mut path = Vec::new();
        decode_object(&self.fields, line, &mut path)
    }
}

fn decode_object(
    fields: &[FieldDescriptor],
    value: &Value,
    path: &mut Vec<String>,
) -> Result<Record, DecodeError> {
    let Value::Object(map) = value else {
        return Err(DecodeError::NotAnObject);
    };
    let mut values = Vec::with_capacity(fields.len());
    let mut event_time = None;
    for descriptor in fields {
        let raw = map.get(&descriptor.json_name).filter(|v| !v.is_null());
        let decoded = match raw {
            Some(raw) => {
                path.push(descriptor.json_name.clone());
                let decoded = decode_value(&descriptor.value, raw, path)?;
                path.pop();
                Some(decoded)
            }
            None if descriptor.required => {
                let mut full = path.clone();
                full.push(descriptor.json_name.clone());
                return Err(DecodeError::MissingField { path: full.join(".") });
            }
            None => None,
        };
        if event_time.is_none()
            && let ValueKind::Timestamp { is_event_time: true, .. } = descriptor.value
        {
            event_time = decoded.as_ref().and_then(FieldValue::as_timestamp);
        }
        values.push(decoded);
    }
    Ok(Record { values, event_time })
}

fn decode_value(
    kind: &ValueKind,
    value: &Value,
    path: &mut Vec<String>,
) -> Result<FieldValue, DecodeError> {
    match kind {
        ValueKind::Bool => match value {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::String(s) => s
                .parse::<bool>()
                .map(FieldValue::Bool)
                .map_err(|_| DecodeError::type_mismatch(path, "boolean", value)),
            _ => Err(DecodeError::type_mismatch(path, "boolean", value)),
        },
        ValueKind::Int16 => decode_int(value, path, "int16")?
            .try_into()
            .map(FieldValue::Int16)
            .map_err(|_| DecodeError::type_mismatch(path, "int16", value)),
        ValueKind::Int32 => decode_int(value, path, "int32")?
            .try_into()
            .map(FieldValue::Int32)
            .map_err(|_| DecodeError::type_mismatch(path, "int32", value)),
        ValueKind::Int64 => decode_int(value, path, "int64").map(FieldValue::Int64),
        ValueKind::Float64 => match value {
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Float64)
                .ok_or_else(|| DecodeError::type_mismatch(path, "float64", value)),
            Value::String(s) => s
                .parse::<f64>()
                .map(FieldValue::Float64)
                .map_err(|_| DecodeError::type_mismatch(path, "float64", value)),
            _ => Err(DecodeError::type_mismatch(path, "float64", value)),
        },
        ValueKind::String { .. } => match value {
            Value::String(s) => Ok(FieldValue::String(s.clone())),
            // Scalars are unquoted into strings; logs frequently mix them.
            Value::Number(n) => Ok(FieldValue::String(n.to_string())),
            Value::Bool(b) => Ok(FieldValue::String(b.to_string())),
            _ => Err(DecodeError::type_mismatch(path, "string", value)),
        },
        ValueKind::Timestamp { codec, .. } => {
            decode_timestamp(codec, value, path).map(FieldValue::Timestamp)
        }
        ValueKind::Json => Ok(FieldValue::Json(value.clone())),
        ValueKind::Array { element } => {
            let Value::Array(items) = value else {
                return Err(DecodeError::type_mismatch(path, "array", value));
            };
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push(i.to_string());
                let decoded = decode_value(element, item, path)?;
                path.pop();
                out.push(decoded);
            }
            Ok(FieldValue::Array(out))
        }
        ValueKind::Object { fields } => match value {
            Value::Object(_) => decode_object(fields, value, path).map(FieldValue::Object),
            _ => Err(DecodeError::type_mismatch(path, "object", value)),
        },
    }
}

fn decode_int(
    value: &Value,
    path: &[String],
    expected: &'static str,
) -> Result<i64, DecodeError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DecodeError::type_mismatch(path, expected, value)),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| DecodeError::type_mismatch(path, expected, value)),
        _ => Err(DecodeError::type_mismatch(path, expected, value)),
    }
}

// =============================================================================
// Timestamp codecs
// =============================================================================

fn decode_timestamp(
    codec: &TimeCodec,
    value: &Value,
    path: &[String],
) -> Result<DateTime<Utc>, DecodeError> {
    match codec {
        TimeCodec::Rfc3339 => {
            let Value::String(s) = value else {
                return Err(DecodeError::bad_timestamp(path, value, codec));
            };
            DateTime::parse_from_rfc3339(s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| DecodeError::bad_timestamp(path, value, codec))
        }
        TimeCodec::UnixSeconds => unix_timestamp(value, 1_000_000_000, path, codec),
        TimeCodec::UnixMillis => unix_timestamp(value, 1_000_000, path, codec),
        TimeCodec::UnixMicros => unix_timestamp(value, 1_000, path, codec),
        TimeCodec::UnixNanos => unix_timestamp(value, 1, path, codec),
        TimeCodec::Strftime(pattern) => {
            let Value::String(s) = value else {
                return Err(DecodeError::bad_timestamp(path, value, codec));
            };
            // Zone-aware patterns parse to an absolute time; zoneless
            // patterns are taken as UTC.
            DateTime::parse_from_str(s, pattern)
                .map(|ts| ts.with_timezone(&Utc))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(s, pattern).map(|naive| naive.and_utc())
                })
                .map_err(|_| DecodeError::bad_timestamp(path, value, codec))
        }
    }
}

/// Decode a numeric unix timestamp with the given nanoseconds-per-unit
/// scale. Accepts integers, floats (fractional sub-unit precision), and
/// numeric strings.
fn unix_timestamp(
    value: &Value,
    unit_nanos: i64,
    path: &[String],
    codec: &TimeCodec,
) -> Result<DateTime<Utc>, DecodeError> {
    let total_nanos: i128 = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i as i128 * unit_nanos as i128
            } else if let Some(f) = n.as_f64() {
                (f * unit_nanos as f64) as i128
            } else {
                return Err(DecodeError::bad_timestamp(path, value, codec));
            }
        }
        Value::String(s) => {
            if let Ok(i) = s.parse::<i64>() {
                i as i128 * unit_nanos as i128
            } else if let Ok(f) = s.parse::<f64>() {
                (f * unit_nanos as f64) as i128
            } else {
                return Err(DecodeError::bad_timestamp(path, value, codec));
            }
        }
        _ => return Err(DecodeError::bad_timestamp(path, value, codec)),
    };
    let secs = total_nanos.div_euclid(1_000_000_000);
    let nanos = total_nanos.rem_euclid(1_000_000_000) as u32;
    let secs: i64 = secs
        .try_into()
        .map_err(|_| DecodeError::bad_timestamp(path, value, codec))?;
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| DecodeError::bad_timestamp(path, value, codec))
}
