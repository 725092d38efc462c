//! Tests for record-type compilation

use strata_schema::{FieldSchema, ValueSchema};

use crate::compile::{compile, TimeCodec, ValueKind};
use crate::error::CompileError;

fn object(fields: Vec<FieldSchema>) -> ValueSchema {
    ValueSchema::object(fields)
}

// =============================================================================
// Descriptors
// =============================================================================

#[test]
fn test_compile_simple_object() {
    let schema = object(vec![
        FieldSchema::new("message", ValueSchema::string()).required(),
        FieldSchema::new("count", ValueSchema::Int64),
    ]);
    let record_type = compile(&schema).unwrap();
    assert_eq!(record_type.fields.len(), 2);

    let message = &record_type.fields[0];
    assert_eq!(message.ident, "message");
    assert_eq!(message.json_name, "message");
    assert!(message.required);
    assert_eq!(message.value, ValueKind::String { indicators: vec![] });

    let count = &record_type.fields[1];
    assert!(!count.required);
    assert_eq!(count.value, ValueKind::Int64);
}

#[test]
fn test_compile_preserves_field_order_and_indexing() {
    let schema = object(vec![
        FieldSchema::new("b", ValueSchema::string()),
        FieldSchema::new("a", ValueSchema::string()),
    ]);
    let record_type = compile(&schema).unwrap();
    assert_eq!(record_type.field_index("b"), Some(0));
    assert_eq!(record_type.field_index("a"), Some(1));
    assert_eq!(record_type.field_index("missing"), None);
}

#[test]
fn test_compile_carries_indicators() {
    let schema = object(vec![FieldSchema::new(
        "addr",
        ValueSchema::string_with(&["ip"]),
    )]);
    let record_type = compile(&schema).unwrap();
    assert_eq!(
        record_type.fields[0].value,
        ValueKind::String { indicators: vec!["ip".to_string()] }
    );
}

#[test]
fn test_compile_normalizes_descriptions() {
    let schema = object(vec![FieldSchema::new("a", ValueSchema::string())
        .describe("first line\n  second line\n\n  third")]);
    let record_type = compile(&schema).unwrap();
    assert_eq!(
        record_type.fields[0].description,
        "first line second line third"
    );
}

#[test]
fn test_compile_nested_objects() {
    let schema = object(vec![FieldSchema::new(
        "peer",
        object(vec![
            FieldSchema::new("addr", ValueSchema::string_with(&["ip"])).required(),
            FieldSchema::new("port", ValueSchema::Int32),
        ]),
    )]);
    let record_type = compile(&schema).unwrap();
    let ValueKind::Object { fields } = &record_type.fields[0].value else {
        panic!("expected a nested object descriptor");
    };
    assert_eq!(fields.len(), 2);
    assert!(fields[0].required);
}

#[test]
fn test_compile_arrays_propagate_element_directives() {
    let schema = object(vec![FieldSchema::new(
        "times",
        ValueSchema::array(ValueSchema::event_timestamp("unix_ms")),
    )]);
    let record_type = compile(&schema).unwrap();
    let ValueKind::Array { element } = &record_type.fields[0].value else {
        panic!("expected an array descriptor");
    };
    assert_eq!(
        **element,
        ValueKind::Timestamp { codec: TimeCodec::UnixMillis, is_event_time: true }
    );
}

// =============================================================================
// Identifier sanitization
// =============================================================================

#[test]
fn test_compile_sanitizes_field_names() {
    let schema = object(vec![
        FieldSchema::new("@timestamp", ValueSchema::string()),
        FieldSchema::new("user name", ValueSchema::string()),
        FieldSchema::new("__meta", ValueSchema::string()),
        FieldSchema::new("2fa", ValueSchema::string()),
    ]);
    let record_type = compile(&schema).unwrap();
    let idents: Vec<&str> = record_type.fields.iter().map(|f| f.ident.as_str()).collect();
    assert_eq!(idents, vec!["timestamp", "username", "meta", "Field_2fa"]);
    // JSON names are untouched.
    assert_eq!(record_type.fields[0].json_name, "@timestamp");
}

#[test]
fn test_compile_rejects_ident_collisions() {
    let schema = object(vec![
        FieldSchema::new("user.name", ValueSchema::string()),
        FieldSchema::new("user name", ValueSchema::string()),
    ]);
    let err = compile(&schema).unwrap_err();
    match err {
        CompileError::DuplicateFieldIdent { ident, first, second, .. } => {
            assert_eq!(ident, "username");
            assert_eq!(first, "user.name");
            assert_eq!(second, "user name");
        }
        other => panic!("expected a duplicate ident error, got {other:?}"),
    }
}

#[test]
fn test_compile_rejects_unsanitizable_names() {
    let schema = object(vec![FieldSchema::new("@!#", ValueSchema::string())]);
    assert!(matches!(
        compile(&schema).unwrap_err(),
        CompileError::EmptyFieldIdent { .. }
    ));
}

// =============================================================================
// Time codecs
// =============================================================================

#[test]
fn test_time_codec_mapping() {
    assert_eq!(TimeCodec::from_format(""), TimeCodec::Rfc3339);
    assert_eq!(TimeCodec::from_format("rfc3339"), TimeCodec::Rfc3339);
    assert_eq!(TimeCodec::from_format("unix"), TimeCodec::UnixSeconds);
    assert_eq!(TimeCodec::from_format("unix_ms"), TimeCodec::UnixMillis);
    assert_eq!(TimeCodec::from_format("unix_us"), TimeCodec::UnixMicros);
    assert_eq!(TimeCodec::from_format("unix_ns"), TimeCodec::UnixNanos);
    assert_eq!(
        TimeCodec::from_format("%Y-%m-%d"),
        TimeCodec::Strftime("%Y-%m-%d".to_string())
    );
}

#[test]
fn test_time_codec_names() {
    assert_eq!(TimeCodec::Rfc3339.name(), "rfc3339");
    assert_eq!(TimeCodec::UnixMillis.name(), "unix_ms");
    assert_eq!(
        TimeCodec::Strftime("%Y-%m-%d".to_string()).name(),
        "strftime=%Y-%m-%d"
    );
}

// =============================================================================
// Compile errors
// =============================================================================

#[test]
fn test_compile_root_must_be_an_object() {
    assert!(matches!(
        compile(&ValueSchema::string()).unwrap_err(),
        CompileError::NotAnObject { .. }
    ));
}

#[test]
fn test_compile_rejects_unresolved_references() {
    let schema = object(vec![FieldSchema::new(
        "peer",
        ValueSchema::reference("Peer"),
    )]);
    let err = compile(&schema).unwrap_err();
    match err {
        CompileError::UnresolvedSchema { target, path } => {
            assert_eq!(target, "Peer");
            assert_eq!(path, "peer");
        }
        other => panic!("expected an unresolved schema error, got {other:?}"),
    }
}

#[test]
fn test_compile_rejects_arrays_without_element_type() {
    let schema = object(vec![FieldSchema::new("items", ValueSchema::empty_array())]);
    let err = compile(&schema).unwrap_err();
    match err {
        CompileError::EmptyValue { path } => assert_eq!(path, "items"),
        other => panic!("expected an empty value error, got {other:?}"),
    }
}

// =============================================================================
// Descriptor serialization
// =============================================================================

#[test]
fn test_descriptors_serialize_for_the_normalization_layer() {
    let schema = object(vec![FieldSchema::new(
        "ts",
        ValueSchema::event_timestamp("unix_ms"),
    )
    .required()]);
    let record_type = compile(&schema).unwrap();
    let json = serde_json::to_value(&record_type).unwrap();
    let field = &json["fields"][0];
    assert_eq!(field["jsonName"], "ts");
    assert_eq!(field["required"], true);
    assert_eq!(field["value"]["kind"], "timestamp");
    assert_eq!(field["value"]["codec"], "unix_ms");
    assert_eq!(field["value"]["isEventTime"], true);
}
