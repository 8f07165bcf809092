use std::any::Any;
use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{TimeDelta, Utc};
use cborlinq_core::{
    create, create_any, create_array, create_object, create_value, ArrayNode, CborLinqError,
    Native, Node, NodeKind, ObjectNode, Scalar, ScalarKind,
};
use indexmap::IndexMap;
use url::Url;
use uuid::Uuid;

fn kind_of<T: cborlinq_core::IntoNode>(value: T) -> NodeKind {
    create(value).expect("value should produce a node").kind()
}

// ============================================================================
// Scalar classification
// ============================================================================

#[test]
fn booleans_classify_as_boolean() {
    assert_eq!(kind_of(true), NodeKind::Boolean);
    assert_eq!(kind_of(false), NodeKind::Boolean);
}

#[test]
fn every_integer_width_classifies_as_integer() {
    assert_eq!(kind_of(1i8), NodeKind::Integer);
    assert_eq!(kind_of(1i16), NodeKind::Integer);
    assert_eq!(kind_of(1i32), NodeKind::Integer);
    assert_eq!(kind_of(1i64), NodeKind::Integer);
    assert_eq!(kind_of(1u8), NodeKind::Integer);
    assert_eq!(kind_of(1u16), NodeKind::Integer);
    assert_eq!(kind_of(1u32), NodeKind::Integer);
    assert_eq!(kind_of(1u64), NodeKind::Integer);
}

#[test]
fn floats_classify_as_float() {
    assert_eq!(kind_of(1.5f32), NodeKind::Float);
    assert_eq!(kind_of(1.5f64), NodeKind::Float);
}

#[test]
fn text_like_scalars_classify_as_string() {
    assert_eq!(kind_of("abc"), NodeKind::String);
    assert_eq!(kind_of(String::from("abc")), NodeKind::String);
    assert_eq!(kind_of(BigDecimal::from_str("1.25").unwrap()), NodeKind::String);
    assert_eq!(kind_of(Utc::now()), NodeKind::String);
    assert_eq!(kind_of(Utc::now().naive_utc()), NodeKind::String);
    assert_eq!(kind_of(TimeDelta::minutes(3)), NodeKind::String);
    assert_eq!(kind_of(Uuid::nil()), NodeKind::String);
    assert_eq!(kind_of(Url::parse("https://example.com/").unwrap()), NodeKind::String);
}

#[test]
fn byte_buffers_classify_as_bytes() {
    assert_eq!(kind_of(vec![1u8, 2, 3]), NodeKind::Bytes);
    assert_eq!(kind_of(&[1u8, 2, 3][..]), NodeKind::Bytes);
}

#[test]
fn scalar_keeps_its_native_width() {
    let node = create(7u16).unwrap();
    let scalar = node.as_scalar().unwrap();
    assert_eq!(scalar.scalar_kind(), ScalarKind::U16);
    assert_eq!(scalar, &Scalar::U16(7));
}

#[test]
fn utc_and_local_date_times_normalise_to_fixed_offset() {
    let now = Utc::now();
    let node = create(now).unwrap();
    assert_eq!(node.as_scalar().unwrap().scalar_kind(), ScalarKind::DateTime);
    assert_eq!(node.as_scalar().unwrap(), &Scalar::DateTime(now.fixed_offset()));
}

// ============================================================================
// Absence and null
// ============================================================================

#[test]
fn none_creates_no_node() {
    assert_eq!(create(None::<i32>), None);
    assert_eq!(create(None::<Node>), None);
}

#[test]
fn some_wraps_like_the_inner_value() {
    assert_eq!(create(Some(5i32)), create(5i32));
}

#[test]
fn explicit_null_is_distinct_from_absent() {
    assert_eq!(create(Node::Null), Some(Node::Null));
    assert_ne!(create(Node::Null), create(None::<Node>));
    assert!(Node::Null.is_null());
    assert_eq!(Node::Null.kind(), NodeKind::Null);
    assert_eq!(Node::Null.as_native(), Native::Null);
}

// ============================================================================
// Pass-through
// ============================================================================

#[test]
fn existing_node_is_returned_unchanged() {
    let original = Node::from(create_array([1u8, 2, 3]));
    assert_eq!(create(original.clone()), Some(original));
}

#[test]
fn existing_scalar_is_wrapped_without_conversion() {
    let scalar = Scalar::I16(-3);
    assert_eq!(create(scalar.clone()), Some(Node::Scalar(scalar)));
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn array_wraps_each_element_in_order() {
    let array = create_array([Some(1i64), None, Some(3)]);
    assert_eq!(array.len(), 3);
    assert_eq!(array.get(0).unwrap().to_typed::<i64>().unwrap(), 1);
    assert_eq!(array.try_get(1), Some(None));
    assert_eq!(array.get(2).unwrap().to_typed::<i64>().unwrap(), 3);
}

#[test]
fn array_of_nodes_nests() {
    let inner = create_array(["a", "b"]);
    let outer = create_array([create(inner.clone()), create(Node::Null)]);
    assert_eq!(outer.get(0), Some(&Node::Array(inner)));
    assert_eq!(outer.get(1), Some(&Node::Null));
}

#[test]
fn empty_array_and_object() {
    let array = create_array(Vec::<i32>::new());
    assert!(array.is_empty());
    let object = create_object(Vec::<(&str, i32)>::new());
    assert!(object.is_empty());
}

#[test]
fn object_preserves_insertion_order() {
    let object = create_object([("c", 3u8), ("a", 1), ("b", 2)]);
    assert_eq!(object.keys().collect::<Vec<_>>(), ["c", "a", "b"]);
}

#[test]
fn object_with_absent_value_keeps_the_key() {
    let object = create_object([("present", Some(1u8)), ("missing", None)]);
    assert!(object.contains_key("missing"));
    assert_eq!(object.try_get("missing"), Some(None));
    assert_eq!(object.get("missing"), None);
}

#[test]
fn maps_convert_recursively() {
    let mut map = IndexMap::new();
    map.insert("x".to_string(), create_array([1u8]));
    map.insert("y".to_string(), create_array([2u8, 3]));
    let node = create(map).unwrap();
    let object = node.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["x", "y"]);
    assert_eq!(object.get("y").unwrap().as_array().unwrap().len(), 2);

    let sorted: BTreeMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)].into();
    let node = create(sorted).unwrap();
    assert_eq!(node.as_object().unwrap().keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn native_view_exposes_children() {
    let node = Node::from(create_array([true, false]));
    match node.as_native() {
        Native::Array(items) => assert_eq!(items.len(), 2),
        other => panic!("expected array view, got {other:?}"),
    }

    let node = Node::from(create_object([("k", "v")]));
    match node.as_native() {
        Native::Object(map) => assert!(map.contains_key("k")),
        other => panic!("expected object view, got {other:?}"),
    }
}

#[test]
fn containers_are_persistent() {
    let array: ArrayNode = create_array([1u8]);
    let longer = array.with_pushed(create(2u8));
    assert_eq!(array.len(), 1);
    assert_eq!(longer.len(), 2);

    let object: ObjectNode = create_object([("a", 1u8)]);
    let wider = object.with_entry("b", create(2u8));
    assert_eq!(object.len(), 1);
    assert_eq!(wider.keys().collect::<Vec<_>>(), ["a", "b"]);
}

// ============================================================================
// Dynamic construction
// ============================================================================

#[test]
fn create_any_dispatches_on_runtime_type() {
    let values: Vec<Box<dyn Any>> = vec![
        Box::new(5i32),
        Box::new(String::from("x")),
        Box::new("static"),
        Box::new(vec![0u8, 1]),
        Box::new(Uuid::nil()),
    ];
    let kinds: Vec<NodeKind> = values
        .iter()
        .map(|v| create_any(Some(v.as_ref())).unwrap().unwrap().kind())
        .collect();
    assert_eq!(
        kinds,
        [
            NodeKind::Integer,
            NodeKind::String,
            NodeKind::String,
            NodeKind::Bytes,
            NodeKind::String
        ]
    );
}

#[test]
fn create_any_passes_nodes_through() {
    let node = Node::from(create_object([("a", 1u8)]));
    let boxed: Box<dyn Any> = Box::new(node.clone());
    assert_eq!(create_any(Some(boxed.as_ref())).unwrap(), Some(node));
}

#[test]
fn create_any_of_nothing_is_absent() {
    assert_eq!(create_any(None).unwrap(), None);
}

#[test]
fn unsupported_type_is_rejected() {
    #[derive(Debug)]
    struct Point {
        _x: i32,
    }

    let err = create_value(&Point { _x: 1 }).unwrap_err();
    match err {
        CborLinqError::UnsupportedType { type_name } => assert!(type_name.contains("Point")),
        other => panic!("expected UnsupportedType, got {other:?}"),
    }

    let boxed: Box<dyn Any> = Box::new(Point { _x: 2 });
    match create_any(Some(boxed.as_ref())).unwrap_err() {
        CborLinqError::UnsupportedType { type_name } => {
            assert!(type_name.starts_with("dyn Any with TypeId"), "{type_name}")
        }
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn display_renders_value_and_type() {
    assert_eq!(Node::from(123i32).to_string(), "123 [i32]");
    assert_eq!(Node::from("ABC").to_string(), "\"ABC\"");
    assert_eq!(Node::Null.to_string(), "null");
    assert_eq!(
        Node::from(create_array([1u8, 2, 3])).to_string(),
        "array: Count=3"
    );
    assert_eq!(
        Node::from(create_object([("x", 1u8), ("y", 2u8)])).to_string(),
        "object: Members=[x,y]"
    );
}
