//! Tests for document validation

use crate::validate::validate_schema;
use crate::value::{FieldSchema, Schema, ValueSchema};

fn minimal_schema() -> Schema {
    Schema {
        version: 0,
        fields: vec![FieldSchema::new("message", ValueSchema::string())],
        ..Schema::default()
    }
}

// =============================================================================
// Acceptance
// =============================================================================

#[test]
fn test_validate_minimal_document() {
    assert!(validate_schema(&minimal_schema()).is_ok());
}

#[test]
fn test_validate_full_document() {
    let schema = Schema::from_yaml(
        "
schema: SampleAPI
description: Sample API request logs
referenceURL: https://example.com/docs
version: 0
definitions:
  Peer:
    type: object
    fields:
    - name: addr
      type: string
      indicators: [ip]
    - name: port
      type: int32
fields:
- name: time
  type: timestamp
  timeFormat: rfc3339
  isEventTime: true
  required: true
- name: peer
  type: ref
  target: Peer
- name: latency
  type: float64
- name: tags
  type: array
  element:
    type: string
",
    )
    .unwrap();
    assert!(validate_schema(&schema).is_ok());
}

#[test]
fn test_validate_accepts_strftime_time_format() {
    let mut schema = minimal_schema();
    schema.fields.push(FieldSchema::new(
        "ts",
        ValueSchema::timestamp("%Y-%m-%d %H:%M:%S"),
    ));
    assert!(validate_schema(&schema).is_ok());
}

#[test]
fn test_validate_accepts_fastmatch_parser() {
    let schema = Schema::from_yaml(
        "
version: 0
parser:
  fastmatch:
    match:
    - '%{remote_ip} - %{user}'
fields:
- name: remote_ip
  type: string
  indicators: [ip]
",
    )
    .unwrap();
    assert!(validate_schema(&schema).is_ok());
}

// =============================================================================
// Rejection
// =============================================================================

#[test]
fn test_validate_empty_document_fails_with_problems() {
    let err = validate_schema(&Schema::default()).unwrap_err();
    let problems = err.validation_problems();
    assert!(!problems.is_empty());
}

#[test]
fn test_validate_rejects_bad_schema_name() {
    let mut schema = minimal_schema();
    schema.name = "x".to_string();
    assert!(validate_schema(&schema).is_err());

    schema.name = "lowercase_name".to_string();
    assert!(validate_schema(&schema).is_err());

    schema.name = "GoodName".to_string();
    assert!(validate_schema(&schema).is_ok());
}

#[test]
fn test_validate_rejects_wrong_version() {
    let mut schema = minimal_schema();
    schema.version = 1;
    assert!(validate_schema(&schema).is_err());
}

#[test]
fn test_validate_rejects_array_without_element() {
    let mut schema = minimal_schema();
    schema
        .fields
        .push(FieldSchema::new("items", ValueSchema::empty_array()));
    assert!(validate_schema(&schema).is_err());
}

#[test]
fn test_validate_rejects_unknown_indicator() {
    let mut schema = minimal_schema();
    schema.fields.push(FieldSchema::new(
        "addr",
        ValueSchema::string_with(&["not_an_indicator"]),
    ));
    assert!(validate_schema(&schema).is_err());
}

#[test]
fn test_validate_rejects_timestamp_without_format() {
    let mut schema = minimal_schema();
    schema
        .fields
        .push(FieldSchema::new("ts", ValueSchema::timestamp("")));
    assert!(validate_schema(&schema).is_err());
}

#[test]
fn test_validate_rejects_bad_definition_name() {
    let mut schema = minimal_schema();
    schema.definitions.insert(
        "bad_name".to_string(),
        ValueSchema::object(vec![FieldSchema::new("a", ValueSchema::string())]),
    );
    assert!(validate_schema(&schema).is_err());
}

#[test]
fn test_validate_rejects_parser_with_multiple_tokenizers() {
    let schema = Schema::from_yaml(
        "
version: 0
parser:
  native:
    name: syslog
  fastmatch:
    match:
    - '%{a} %{b}'
fields:
- name: message
  type: string
",
    )
    .unwrap();
    assert!(validate_schema(&schema).is_err());
}

#[test]
fn test_validate_problems_carry_paths_and_are_ordered() {
    let mut schema = minimal_schema();
    schema.version = 1;
    schema.fields.push(FieldSchema::new(
        "addr",
        ValueSchema::string_with(&["bogus"]),
    ));
    let err = validate_schema(&schema).unwrap_err();
    let problems = err.validation_problems();
    assert!(problems.len() >= 2);
    let mut sorted = problems.to_vec();
    sorted.sort();
    assert_eq!(problems, sorted.as_slice());
    assert!(problems.iter().all(|p| !p.message.is_empty()));
}

#[test]
fn test_validate_does_not_mutate_the_document() {
    let schema = minimal_schema();
    let copy = schema.clone();
    let _ = validate_schema(&schema);
    assert_eq!(schema, copy);
}
