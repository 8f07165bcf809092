//! The node tree: a closed sum type over CBOR's value space.
//!
//! A document is a strict tree of immutable [`Node`]s. Container slots hold
//! `Option<Node>`: `None` is a slot for which no value was ever created, while
//! `Some(Node::Null)` is an explicit CBOR null. Both encode identically.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use url::Url;
use uuid::Uuid;

use crate::coerce::FromNode;
use crate::container::{ArrayNode, ObjectNode};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::uri::UriRef;

/// Semantic kind a node reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
    Array,
    Object,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => "null",
            NodeKind::Boolean => "boolean",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::String => "string",
            NodeKind::Bytes => "bytes",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// A CBOR document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Explicit CBOR null.
    Null,
    Scalar(Scalar),
    Array(ArrayNode),
    Object(ObjectNode),
}

/// Borrowed closest-fidelity native view of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Native<'a> {
    /// The absence value.
    Null,
    Scalar(&'a Scalar),
    Array(&'a [Option<Node>]),
    Object(&'a IndexMap<String, Option<Node>>),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Scalar(s) => s.kind(),
            Node::Array(_) => NodeKind::Array,
            Node::Object(_) => NodeKind::Object,
        }
    }

    pub fn as_native(&self) -> Native<'_> {
        match self {
            Node::Null => Native::Null,
            Node::Scalar(s) => Native::Scalar(s),
            Node::Array(a) => Native::Array(a.as_slice()),
            Node::Object(o) => Native::Object(o.as_map()),
        }
    }

    /// Coerce this node to `T` using the coercion matrix.
    ///
    /// ```
    /// use cborlinq_core::Node;
    ///
    /// let node = Node::from(123u8);
    /// assert_eq!(node.to_typed::<i64>().unwrap(), 123);
    /// assert_eq!(node.to_typed::<String>().unwrap(), "123");
    /// assert_eq!(Node::Null.to_typed::<Option<i32>>().unwrap(), None);
    /// ```
    pub fn to_typed<T: FromNode>(&self) -> Result<T> {
        T::from_node(self)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Node::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Wire-level equality.
    ///
    /// Two trees are equivalent when they would encode to the same CBOR data
    /// model: integers compare by value regardless of width, text-like scalars
    /// by canonical text, and an absent slot equals an explicit null.
    pub fn equivalent(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Scalar(a), Node::Scalar(b)) => a.wire_form() == b.wire_form(),
            (Node::Array(a), Node::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| slots_equivalent(x, y))
            }
            (Node::Object(a), Node::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && slots_equivalent(va, vb))
            }
            _ => false,
        }
    }
}

/// [`Node::equivalent`] lifted to container slots.
pub fn slots_equivalent(a: Option<&Node>, b: Option<&Node>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.equivalent(b),
        (Some(n), None) | (None, Some(n)) => n.is_null(),
        (None, None) => true,
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("null"),
            Node::Scalar(s) => write!(f, "{s}"),
            Node::Array(a) => write!(f, "array: Count={}", a.len()),
            Node::Object(o) => {
                let keys: Vec<&str> = o.keys().collect();
                write!(f, "object: Members=[{}]", keys.join(","))
            }
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(value)
    }
}

impl From<ArrayNode> for Node {
    fn from(value: ArrayNode) -> Self {
        Node::Array(value)
    }
}

impl From<ObjectNode> for Node {
    fn from(value: ObjectNode) -> Self {
        Node::Object(value)
    }
}

macro_rules! node_from_scalar {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Node {
                fn from(value: $source) -> Self {
                    Node::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

node_from_scalar!(
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
