//! Tests for reference resolution

use std::collections::BTreeMap;

use crate::error::SchemaError;
use crate::resolve::{resolve, MAX_DEPTH};
use crate::value::{FieldSchema, Schema, ValueSchema};

fn schema_with(
    definitions: BTreeMap<String, ValueSchema>,
    fields: Vec<FieldSchema>,
) -> Schema {
    Schema { definitions, fields, ..Schema::default() }
}

fn type_foo() -> ValueSchema {
    ValueSchema::object(vec![
        FieldSchema::new("fieldA", ValueSchema::string()),
        FieldSchema::new("fieldBar", ValueSchema::reference("Bar")),
    ])
}

fn type_bar() -> ValueSchema {
    ValueSchema::object(vec![FieldSchema::new("fieldA", ValueSchema::string())])
}

// =============================================================================
// Reference splicing
// =============================================================================

#[test]
fn test_resolve_splices_nested_references() {
    let mut definitions = BTreeMap::new();
    definitions.insert("Foo".to_string(), type_foo());
    definitions.insert("Bar".to_string(), type_bar());
    let schema = schema_with(
        definitions,
        vec![
            FieldSchema::new("fieldA", ValueSchema::string()),
            FieldSchema::new("fieldFoo", ValueSchema::reference("Foo")),
        ],
    );

    let actual = resolve(&schema).unwrap();
    let expect = ValueSchema::object(vec![
        FieldSchema::new("fieldA", ValueSchema::string()),
        FieldSchema::new(
            "fieldFoo",
            ValueSchema::object(vec![
                FieldSchema::new("fieldA", ValueSchema::string()),
                FieldSchema::new("fieldBar", type_bar()),
            ]),
        ),
    ]);
    assert_eq!(actual, expect);
}

#[test]
fn test_resolve_missing_definition_fails() {
    let mut definitions = BTreeMap::new();
    definitions.insert("Foo".to_string(), type_foo());
    // Foo references Bar, which is not defined.
    let schema = schema_with(
        definitions,
        vec![FieldSchema::new("fieldFoo", ValueSchema::reference("Foo"))],
    );

    let err = resolve(&schema).unwrap_err();
    match err {
        SchemaError::UnresolvedRef { target, path } => {
            assert_eq!(target, "Bar");
            assert_eq!(path, "fieldFoo.fieldBar");
        }
        other => panic!("expected an unresolved reference error, got {other:?}"),
    }
}

#[test]
fn test_resolve_empty_target_fails() {
    let schema = schema_with(
        BTreeMap::new(),
        vec![FieldSchema::new("field", ValueSchema::reference(""))],
    );
    assert!(matches!(
        resolve(&schema).unwrap_err(),
        SchemaError::EmptyRef { .. }
    ));
}

#[test]
fn test_resolve_keeps_field_metadata() {
    let schema = schema_with(
        BTreeMap::new(),
        vec![
            FieldSchema::new("ts", ValueSchema::event_timestamp("unix"))
                .required()
                .describe("event timestamp"),
            FieldSchema::new("addr", ValueSchema::string_with(&["ip"])),
        ],
    );
    let ValueSchema::Object { fields } = resolve(&schema).unwrap() else {
        panic!("root must resolve to an object");
    };
    assert!(fields[0].required);
    assert_eq!(fields[0].description, "event timestamp");
    assert_eq!(fields[0].value, ValueSchema::event_timestamp("unix"));
    assert_eq!(fields[1].value, ValueSchema::string_with(&["ip"]));
}

#[test]
fn test_resolve_array_elements() {
    let mut definitions = BTreeMap::new();
    definitions.insert("Bar".to_string(), type_bar());
    let schema = schema_with(
        definitions,
        vec![FieldSchema::new(
            "items",
            ValueSchema::array(ValueSchema::reference("Bar")),
        )],
    );
    let expect = ValueSchema::object(vec![FieldSchema::new(
        "items",
        ValueSchema::array(type_bar()),
    )]);
    assert_eq!(resolve(&schema).unwrap(), expect);
}

#[test]
fn test_resolve_array_path_uses_element_marker() {
    let schema = schema_with(
        BTreeMap::new(),
        vec![FieldSchema::new(
            "items",
            ValueSchema::array(ValueSchema::reference("Missing")),
        )],
    );
    let err = resolve(&schema).unwrap_err();
    match err {
        SchemaError::UnresolvedRef { path, .. } => assert_eq!(path, "items.[]"),
        other => panic!("expected an unresolved reference error, got {other:?}"),
    }
}

// =============================================================================
// Cycles and depth
// =============================================================================

#[test]
fn test_resolve_cyclic_reference_reports_chain() {
    let mut definitions = BTreeMap::new();
    definitions.insert(
        "Foo".to_string(),
        ValueSchema::object(vec![FieldSchema::new("next", ValueSchema::reference("Bar"))]),
    );
    definitions.insert(
        "Bar".to_string(),
        ValueSchema::object(vec![FieldSchema::new("back", ValueSchema::reference("Foo"))]),
    );
    let schema = schema_with(
        definitions,
        vec![FieldSchema::new("root", ValueSchema::reference("Foo"))],
    );

    let err = resolve(&schema).unwrap_err();
    match err {
        SchemaError::CyclicReference { target, cycle, .. } => {
            assert_eq!(target, "Foo");
            assert_eq!(cycle, vec!["Foo".to_string(), "Bar".to_string()]);
        }
        other => panic!("expected a cyclic reference error, got {other:?}"),
    }
}

#[test]
fn test_resolve_self_reference_fails() {
    let mut definitions = BTreeMap::new();
    definitions.insert(
        "Node".to_string(),
        ValueSchema::object(vec![FieldSchema::new(
            "child",
            ValueSchema::reference("Node"),
        )]),
    );
    let schema = schema_with(
        definitions,
        vec![FieldSchema::new("root", ValueSchema::reference("Node"))],
    );
    assert!(matches!(
        resolve(&schema).unwrap_err(),
        SchemaError::CyclicReference { .. }
    ));
}

#[test]
fn test_resolve_depth_cap_is_an_error_not_an_overflow() {
    // Nest objects well past the cap.
    let mut value = ValueSchema::string();
    for _ in 0..MAX_DEPTH + 8 {
        value = ValueSchema::object(vec![FieldSchema::new("nested", value)]);
    }
    let schema = schema_with(BTreeMap::new(), vec![FieldSchema::new("root", value)]);

    let err = resolve(&schema).unwrap_err();
    match err {
        SchemaError::MaxDepthExceeded { max, .. } => assert_eq!(max, MAX_DEPTH),
        other => panic!("expected a depth error, got {other:?}"),
    }
}

#[test]
fn test_resolve_depth_just_below_cap_succeeds() {
    let mut value = ValueSchema::string();
    for _ in 0..MAX_DEPTH - 2 {
        value = ValueSchema::object(vec![FieldSchema::new("nested", value)]);
    }
    let schema = schema_with(BTreeMap::new(), vec![FieldSchema::new("root", value)]);
    assert!(resolve(&schema).is_ok());
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_resolve_is_deterministic() {
    let mut definitions = BTreeMap::new();
    definitions.insert("Foo".to_string(), type_foo());
    definitions.insert("Bar".to_string(), type_bar());
    let schema = schema_with(
        definitions,
        vec![
            FieldSchema::new("one", ValueSchema::reference("Foo")),
            FieldSchema::new("two", ValueSchema::reference("Bar")),
        ],
    );
    assert_eq!(resolve(&schema).unwrap(), resolve(&schema).unwrap());
}

#[test]
fn test_resolve_sibling_branches_may_share_definitions() {
    // The same definition used twice is not a cycle.
    let mut definitions = BTreeMap::new();
    definitions.insert("Bar".to_string(), type_bar());
    let schema = schema_with(
        definitions,
        vec![
            FieldSchema::new("first", ValueSchema::reference("Bar")),
            FieldSchema::new("second", ValueSchema::reference("Bar")),
        ],
    );
    let expect = ValueSchema::object(vec![
        FieldSchema::new("first", type_bar()),
        FieldSchema::new("second", type_bar()),
    ]);
    assert_eq!(resolve(&schema).unwrap(), expect);
}
