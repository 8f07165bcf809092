//! Node construction façade.
//!
//! [`create`] turns any admitted native value into the smallest fitting node.
//! An `Option` that is `None` produces no node at all, which is distinct from
//! an explicit [`Node::Null`] until the tree is encoded. A value that is
//! already a node is passed through untouched.
//!
//! ```
//! use cborlinq_core::{create, create_array, create_object, Node, NodeKind};
//!
//! let node = create(42u8).unwrap();
//! assert_eq!(node.kind(), NodeKind::Integer);
//! assert_eq!(create(None::<i32>), None);
//!
//! let list = create_array([Some(1i64), None, Some(3)]);
//! assert_eq!(list.len(), 3);
//!
//! let object = create_object([("name", create("Alice")), ("age", create(30))]);
//! assert_eq!(object.get("name").unwrap().to_typed::<String>().unwrap(), "Alice");
//! ```

use std::any::{type_name, Any};
use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use url::Url;
use uuid::Uuid;

use crate::container::{ArrayNode, ObjectNode};
use crate::error::{CborLinqError, Result};
use crate::scalar::Scalar;
use crate::uri::UriRef;
use crate::types::Node;

/// Conversion of a native value (or node) into an optional node.
pub trait IntoNode {
    fn into_node(self) -> Option<Node>;
}

/// Wrap `value` as a node. Returns `None` only for absent input.
pub fn create<T: IntoNode>(value: T) -> Option<Node> {
    value.into_node()
}

/// Build an array, wrapping each element. `None` elements stay absent slots.
pub fn create_array<I>(items: I) -> ArrayNode
where
    I: IntoIterator,
    I::Item: IntoNode,
{
    items.into_iter().map(IntoNode::into_node).collect()
}

/// Build an object from key/value pairs, wrapping each value.
///
/// Keys are unique: a repeated key keeps its first position and its last value.
pub fn create_object<I, K, V>(entries: I) -> ObjectNode
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoNode,
{
    entries
        .into_iter()
        .map(|(key, value)| (key, value.into_node()))
        .collect()
}

impl IntoNode for Node {
    fn into_node(self) -> Option<Node> {
        Some(self)
    }
}

impl IntoNode for Scalar {
    fn into_node(self) -> Option<Node> {
        Some(Node::Scalar(self))
    }
}

impl IntoNode for ArrayNode {
    fn into_node(self) -> Option<Node> {
        Some(Node::Array(self))
    }
}

impl IntoNode for ObjectNode {
    fn into_node(self) -> Option<Node> {
        Some(Node::Object(self))
    }
}

impl<T: IntoNode> IntoNode for Option<T> {
    fn into_node(self) -> Option<Node> {
        self.and_then(IntoNode::into_node)
    }
}

impl<V: IntoNode> IntoNode for IndexMap<String, V> {
    fn into_node(self) -> Option<Node> {
        Some(Node::Object(create_object(self)))
    }
}

impl<V: IntoNode> IntoNode for BTreeMap<String, V> {
    fn into_node(self) -> Option<Node> {
        Some(Node::Object(create_object(self)))
    }
}

macro_rules! scalar_into_node {
    ($($source:ty),* $(,)?) => {
        $(
            impl IntoNode for $source {
                fn into_node(self) -> Option<Node> {
                    Some(Node::from(self))
                }
            }
        )*
    };
}

scalar_into_node!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    &[u8],
    BigDecimal,
    DateTime<FixedOffset>,
    DateTime<Utc>,
    DateTime<Local>,
    NaiveDateTime,
    TimeDelta,
    Uuid,
    Url,
    UriRef,
);

/// Wrap a value whose type is only known at runtime.
///
/// `None` yields `Ok(None)`. A [`Node`] is returned as is (cloned out of the
/// borrow). Any type outside the admitted scalar set fails with
/// [`CborLinqError::UnsupportedType`].
///
/// A `dyn Any` carries no type name, so the error can only report the
/// `TypeId`. Use [`create_value`] when the static type is known and the error
/// should name it.
pub fn create_any(value: Option<&dyn Any>) -> Result<Option<Node>> {
    match value {
        None => Ok(None),
        Some(value) => dispatch(value).ok_or_else(|| CborLinqError::UnsupportedType {
            type_name: format!("dyn Any with {:?}", (*value).type_id()),
        }),
    }
}

/// Like [`create_any`] for a statically typed borrow; errors name the type.
///
/// ```
/// use cborlinq_core::{create_value, CborLinqError};
///
/// assert!(create_value(&7u32).unwrap().is_some());
///
/// struct Opaque;
/// let err = create_value(&Opaque).unwrap_err();
/// assert!(matches!(err, CborLinqError::UnsupportedType { .. }));
/// assert!(err.to_string().contains("Opaque"));
/// ```
pub fn create_value<T: Any>(value: &T) -> Result<Option<Node>> {
    dispatch(value).ok_or_else(|| CborLinqError::UnsupportedType {
        type_name: type_name::<T>().to_owned(),
    })
}

fn dispatch(value: &dyn Any) -> Option<Option<Node>> {
    macro_rules! try_scalars {
        ($($t:ty),* $(,)?) => {
            $(
                if let Some(v) = value.downcast_ref::<$t>() {
                    return Some(Some(Node::from(v.clone())));
                }
            )*
        };
    }

    if let Some(node) = value.downcast_ref::<Node>() {
        return Some(Some(node.clone()));
    }
    if let Some(slot) = value.downcast_ref::<Option<Node>>() {
        return Some(slot.clone());
    }
    if let Some(scalar) = value.downcast_ref::<Scalar>() {
        return Some(Some(Node::Scalar(scalar.clone())));
    }
    if let Some(array) = value.downcast_ref::<ArrayNode>() {
        return Some(Some(Node::Array(array.clone())));
    }
    if let Some(object) = value.downcast_ref::<ObjectNode>() {
        return Some(Some(Node::Object(object.clone())));
    }
    if let Some(text) = value.downcast_ref::<&'static str>() {
        return Some(Some(Node::from(*text)));
    }

    try_scalars!(
        bool,
        i8,
        i16,
        i32,
        i64,
        u8,
        u16,
        u32,
        u64,
        f32,
        f64,
        String,
        Vec<u8>,
        BigDecimal,
        DateTime<FixedOffset>,
        DateTime<Utc>,
        DateTime<Local>,
        NaiveDateTime,
        TimeDelta,
        Uuid,
        Url,
        UriRef,
    );

    None
}
