//! JSON bridge.
//!
//! Nodes serialize through `serde`, so any serde format can render a tree.
//! Byte buffers become base64 text and text-like scalars their canonical text,
//! matching what the CBOR encoder puts on the wire. Absent slots serialize as
//! `null`.
//!
//! Going the other way, [`from_json`] maps JSON integers to `u64` (or `i64`
//! when negative), other numbers to `f64`, and JSON `null` to an absent slot.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::container::{ArrayNode, ObjectNode};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::types::Node;

/// Render a (possibly absent) node as a JSON value.
///
/// Fails only if `serde_json` rejects the rendered value.
pub fn to_json(node: Option<&Node>) -> Result<Value> {
    Ok(serde_json::to_value(node)?)
}

/// Build a node tree from a JSON value. JSON `null` yields `None`.
pub fn from_json(value: &Value) -> Option<Node> {
    let node = match value {
        Value::Null => return None,
        Value::Bool(b) => Node::from(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Node::from(u)
            } else if let Some(i) = n.as_i64() {
                Node::from(i)
            } else {
                Node::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Node::from(s.as_str()),
        Value::Array(items) => Node::Array(items.iter().map(from_json).collect()),
        Value::Object(map) => Node::Object(
            map.iter()
                .map(|(key, value)| (key.as_str(), from_json(value)))
                .collect(),
        ),
    };
    Some(node)
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::Array(array) => array.serialize(serializer),
            Node::Object(object) => object.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::I8(v) => serializer.serialize_i8(*v),
            Scalar::I16(v) => serializer.serialize_i16(*v),
            Scalar::I32(v) => serializer.serialize_i32(*v),
            Scalar::I64(v) => serializer.serialize_i64(*v),
            Scalar::U8(v) => serializer.serialize_u8(*v),
            Scalar::U16(v) => serializer.serialize_u16(*v),
            Scalar::U32(v) => serializer.serialize_u32(*v),
            Scalar::U64(v) => serializer.serialize_u64(*v),
            Scalar::F32(v) => serializer.serialize_f32(*v),
            Scalar::F64(v) => serializer.serialize_f64(*v),
            Scalar::Text(v) => serializer.serialize_str(v),
            Scalar::Bytes(v) => serializer.serialize_str(&BASE64.encode(v)),
            other => {
                serializer.serialize_str(&other.canonical_text())
            }
        }
    }
}

impl Serialize for ArrayNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for item in self.iter() {
            seq.serialize_element(&item)?;
        }
        seq.end()
    }
}

impl Serialize for ObjectNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}
