//! Merge engine
//!
//! Computes the least-permissive common supertype of two resolved value
//! trees: the narrowest schema that can decode values conforming to either
//! input. Inference folds samples through this repeatedly; merge is
//! commutative and associative over resolved trees, so fold order does not
//! matter.

use crate::diff::field_pairs;
use crate::value::{indicator_set, time_format, FieldSchema, ValueSchema, ValueType};

/// Merge two resolved value schemas into a common supertype.
///
/// `None` acts as identity: `merge(None, b)` is a clone of `b`. The output
/// is always a fully independent tree.
///
/// # Panics
///
/// Panics if either input still contains a `ref` node at its root. Merging
/// unresolved trees is a caller bug, never a user-facing condition.
pub fn merge(a: Option<&ValueSchema>, b: Option<&ValueSchema>) -> Option<ValueSchema> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (Some(a), Some(b)) => Some(merge_resolved(a, b)),
    }
}

fn merge_resolved(a: &ValueSchema, b: &ValueSchema) -> ValueSchema {
    use ValueSchema as V;
    assert!(
        a.value_type() != ValueType::Ref && b.value_type() != ValueType::Ref,
        "cannot merge unresolved value schemas"
    );
    match (a, b) {
        (V::Object { fields: fields_a }, V::Object { fields: fields_b }) => V::Object {
            fields: merge_object_fields(fields_a, fields_b),
        },
        (V::Array { element: el_a }, V::Array { element: el_b }) => V::Array {
            element: merge(el_a.as_deref(), el_b.as_deref()).map(Box::new),
        },
        (V::String { indicators: ind_a }, V::String { indicators: ind_b }) => {
            // Indicators survive only when both sides agree on the set.
            let (set_a, set_b) = (indicator_set(ind_a), indicator_set(ind_b));
            if set_a == set_b {
                V::String { indicators: set_a }
            } else {
                V::string()
            }
        }
        (
            V::Timestamp { time_format: fmt_a, is_event_time: evt_a },
            V::Timestamp { time_format: fmt_b, is_event_time: evt_b },
        ) => {
            if fmt_a != fmt_b {
                return V::string();
            }
            V::Timestamp {
                time_format: fmt_a.clone(),
                // Event time is sticky: once either side marks it, it stays.
                is_event_time: *evt_a || *evt_b,
            }
        }
        _ if a.value_type() == b.value_type() => a.clone(),
        _ => merge_mixed(a, b),
    }
}

/// Cross-type widening. The order of cases is significant: each cast
/// helper only handles the lesser types in the order
/// json > object,array > timestamp > string > float64 > int64 > int32.
fn merge_mixed(a: &ValueSchema, b: &ValueSchema) -> ValueSchema {
    use ValueType as T;
    let (type_a, type_b) = (a.value_type(), b.value_type());
    if type_a == T::Json || type_b == T::Json {
        return ValueSchema::Json;
    }
    if type_a.is_composite() || type_b.is_composite() {
        return ValueSchema::Json;
    }
    if let ValueSchema::Timestamp { time_format, is_event_time } = a {
        return cast_timestamp(type_b, time_format, *is_event_time);
    }
    if let ValueSchema::Timestamp { time_format, is_event_time } = b {
        return cast_timestamp(type_a, time_format, *is_event_time);
    }
    if type_a == T::String || type_b == T::String {
        return ValueSchema::string();
    }
    if type_a == T::Float64 {
        return cast_float(type_b);
    }
    if type_b == T::Float64 {
        return cast_float(type_a);
    }
    if type_a == T::Int64 {
        return cast_int64(type_b);
    }
    if type_b == T::Int64 {
        return cast_int64(type_a);
    }
    if type_a == T::Int32 {
        return cast_int32(type_b);
    }
    if type_b == T::Int32 {
        return cast_int32(type_a);
    }
    ValueSchema::string()
}

/// Try to cast the non-timestamp side into the timestamp's format.
///
/// Integer widths cast cleanly into any unix-family format. Floats carry
/// sub-second fractions, so they only cast into `unix` (seconds); merged
/// with a millisecond/microsecond/nanosecond format the value stays a
/// plain number.
fn cast_timestamp(other: ValueType, fmt: &str, is_event_time: bool) -> ValueSchema {
    match other {
        ValueType::Int64 | ValueType::Int32 | ValueType::Int16
            if time_format::is_unix_family(fmt) =>
        {
            ValueSchema::Timestamp {
                time_format: fmt.to_string(),
                is_event_time,
            }
        }
        ValueType::Float64 if fmt == time_format::UNIX => ValueSchema::Timestamp {
            time_format: fmt.to_string(),
            is_event_time,
        },
        ValueType::Float64 if time_format::is_unix_family(fmt) => ValueSchema::Float64,
        _ => ValueSchema::string(),
    }
}

fn cast_float(other: ValueType) -> ValueSchema {
    match other {
        ValueType::Int64 | ValueType::Int32 | ValueType::Int16 => ValueSchema::Float64,
        _ => ValueSchema::string(),
    }
}

fn cast_int64(other: ValueType) -> ValueSchema {
    match other {
        ValueType::Int32 | ValueType::Int16 => ValueSchema::Int64,
        _ => ValueSchema::string(),
    }
}

fn cast_int32(other: ValueType) -> ValueSchema {
    match other {
        ValueType::Int16 => ValueSchema::Int32,
        _ => ValueSchema::string(),
    }
}

/// Union two field lists by name.
///
/// A field present on only one side keeps its shape but becomes optional,
/// since it was absent at least once. A field present on both sides merges
/// its value type and stays required only if required on both sides.
fn merge_object_fields(a: &[FieldSchema], b: &[FieldSchema]) -> Vec<FieldSchema> {
    let mut fields = Vec::new();
    for pair in field_pairs(a, b) {
        match (pair.a, pair.b) {
            (Some(field_a), Some(field_b)) => {
                let value = merge_resolved(&field_a.value, &field_b.value);
                fields.push(FieldSchema {
                    name: field_a.name.clone(),
                    required: field_a.required && field_b.required,
                    description: String::new(),
                    value,
                });
            }
            (Some(only), None) | (None, Some(only)) => {
                let mut field = only.clone();
                field.required = false;
                fields.push(field);
            }
            (None, None) => {}
        }
    }
    fields
}
