//! Schema inference from sample values
//!
//! Builds a best-guess resolved value tree from decoded JSON samples. One
//! sample gives one tree; a corpus is folded through [`merge`], which is
//! commutative and associative, so sample order does not matter. Fields
//! are born required and demote to optional when a later sample lacks
//! them.

use serde_json::Value;

use crate::merge::merge;
use crate::value::{time_format, FieldSchema, ValueSchema};

/// Infer the value schema of a single decoded JSON value.
///
/// Returns `None` for `null`, which contributes no type information.
pub fn infer_json(value: &Value) -> Option<ValueSchema> {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<FieldSchema> = map
                .iter()
                .filter_map(|(key, val)| {
                    infer_json(val).map(|value| FieldSchema {
                        name: key.clone(),
                        // Required by default; demoted by later merges if
                        // absent from other samples.
                        required: true,
                        description: String::new(),
                        value,
                    })
                })
                .collect();
            // Sorted for deterministic output regardless of key order.
            fields.sort_by(|a, b| a.name.cmp(&b.name));
            Some(ValueSchema::Object { fields })
        }
        Value::Array(items) => {
            // An empty array yields no element type; later merges fill it
            // in if other samples carry elements.
            let mut element = None;
            for item in items {
                element = merge(element.as_ref(), infer_json(item).as_ref());
            }
            Some(ValueSchema::Array { element: element.map(Box::new) })
        }
        Value::Number(n) => Some(if n.as_i64().is_some() {
            ValueSchema::Int64
        } else {
            ValueSchema::Float64
        }),
        Value::String(s) => Some(infer_string(s)),
        Value::Bool(_) => Some(ValueSchema::Boolean),
        Value::Null => None,
    }
}

/// Fold a corpus of samples into one inferred schema, optionally extending
/// a previously inferred value.
pub fn infer_samples<'a, I>(samples: I, prior: Option<ValueSchema>) -> Option<ValueSchema>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut merged = prior;
    for sample in samples {
        merged = merge(merged.as_ref(), infer_json(sample).as_ref());
    }
    merged
}

fn infer_string(s: &str) -> ValueSchema {
    if s.parse::<i64>().is_ok() {
        return ValueSchema::Int64;
    }
    if s.parse::<f64>().is_ok() {
        return ValueSchema::Float64;
    }
    if is_bool_literal(s) {
        return ValueSchema::Boolean;
    }
    if chrono::DateTime::parse_from_rfc3339(s).is_ok() {
        return ValueSchema::timestamp(time_format::RFC3339);
    }
    ValueSchema::String { indicators: infer_indicators(s) }
}

fn is_bool_literal(s: &str) -> bool {
    matches!(
        s,
        "t" | "T" | "true" | "True" | "TRUE" | "f" | "F" | "false" | "False" | "FALSE"
    )
}

fn infer_indicators(s: &str) -> Vec<String> {
    if s.parse::<std::net::IpAddr>().is_ok() {
        return vec!["ip".to_string()];
    }
    if looks_like_url(s) {
        return vec!["url".to_string()];
    }
    if looks_like_arn(s) {
        return vec!["aws_arn".to_string()];
    }
    Vec::new()
}

fn looks_like_url(s: &str) -> bool {
    let Some(rest) = s
        .strip_prefix("http://")
        .or_else(|| s.strip_prefix("https://"))
    else {
        return false;
    };
    !rest.is_empty() && !s.chars().any(char::is_whitespace)
}

/// ARN shape: `arn:partition:service:region:account:resource`, where the
/// resource part may itself contain colons.
fn looks_like_arn(s: &str) -> bool {
    let mut sections = s.splitn(6, ':');
    sections.next() == Some("arn")
        && sections.next().is_some_and(|partition| !partition.is_empty())
        && sections.next().is_some_and(|service| !service.is_empty())
        && sections.nth(2).is_some()
}

impl ValueSchema {
    /// Strip object fields and array elements whose type was never
    /// established, so degenerate empty composites do not pollute an
    /// inferred schema.
    ///
    /// Returns `None` when nothing survives.
    pub fn non_empty(&self) -> Option<ValueSchema> {
        match self {
            Self::Object { fields } => {
                let fields: Vec<FieldSchema> = fields
                    .iter()
                    .filter_map(|field| {
                        field.value.non_empty().map(|value| FieldSchema {
                            name: field.name.clone(),
                            required: field.required,
                            description: field.description.clone(),
                            value,
                        })
                    })
                    .collect();
                if fields.is_empty() {
                    return None;
                }
                Some(Self::Object { fields })
            }
            Self::Array { element } => {
                let element = element.as_ref().and_then(|el| el.non_empty())?;
                Some(Self::Array { element: Some(Box::new(element)) })
            }
            other => Some(other.clone()),
        }
    }
}
