//! Tree → CBOR encoder.
//!
//! Walks a node tree depth-first and writes it through `minicbor`'s primitive
//! encoder. Every scalar is emitted with the primitive matching its native
//! width; text-like scalars (decimal, date-time, duration, UUID, URI) become
//! CBOR text strings in their canonical form. Arrays and maps always carry a
//! definite length, and map entries keep their insertion order, so encoding
//! the same tree twice yields the same bytes.
//!
//! # Example
//! ```
//! use cborlinq_core::{create_array, encode, Node};
//!
//! let tree = Node::from(create_array([Some(1u8), None]));
//! assert_eq!(encode(&tree).unwrap(), [0x82, 0x01, 0xf6]);
//! ```

use std::fmt::Display;

use minicbor::encode::Write;
use minicbor::Encoder;
use tracing::{debug, trace};

use crate::container::{ArrayNode, ObjectNode};
use crate::error::{CborLinqError, Result};
use crate::scalar::Scalar;
use crate::types::Node;

/// Encode a node tree into a fresh CBOR buffer.
pub fn encode(node: &Node) -> Result<Vec<u8>> {
    let mut e = Encoder::new(Vec::new());
    node.encode(&mut e)?;
    let bytes = e.into_writer();
    debug!(kind = %node.kind(), bytes = bytes.len(), "encoded CBOR document");
    Ok(bytes)
}

/// Encode a container slot: an absent slot is written as CBOR null.
pub fn encode_slot<W>(slot: Option<&Node>, e: &mut Encoder<W>) -> Result<()>
where
    W: Write,
    W::Error: Display,
{
    match slot {
        Some(node) => node.encode(e),
        None => put(e.null()),
    }
}

impl Node {
    /// Write this node (and its subtree) to `e`.
    pub fn encode<W>(&self, e: &mut Encoder<W>) -> Result<()>
    where
        W: Write,
        W::Error: Display,
    {
        match self {
            Node::Null => put(e.null()),
            Node::Scalar(scalar) => encode_scalar(scalar, e),
            Node::Array(array) => encode_array(array, e),
            Node::Object(object) => encode_object(object, e),
        }
    }
}

fn encode_scalar<W>(scalar: &Scalar, e: &mut Encoder<W>) -> Result<()>
where
    W: Write,
    W::Error: Display,
{
    match scalar {
        Scalar::Bool(v) => put(e.bool(*v)),
        Scalar::I8(v) => put(e.i8(*v)),
        Scalar::I16(v) => put(e.i16(*v)),
        Scalar::I32(v) => put(e.i32(*v)),
        Scalar::I64(v) => put(e.i64(*v)),
        Scalar::U8(v) => put(e.u8(*v)),
        Scalar::U16(v) => put(e.u16(*v)),
        Scalar::U32(v) => put(e.u32(*v)),
        Scalar::U64(v) => put(e.u64(*v)),
        Scalar::F32(v) => put(e.f32(*v)),
        Scalar::F64(v) => put(e.f64(*v)),
        Scalar::Bytes(v) => put(e.bytes(v)),
        text_like => {
            put(e.str(&text_like.canonical_text()))
        }
    }
}

fn encode_array<W>(array: &ArrayNode, e: &mut Encoder<W>) -> Result<()>
where
    W: Write,
    W::Error: Display,
{
    trace!(len = array.len(), "array header");
    put(e.array(array.len() as u64))?;
    for item in array.iter() {
        encode_slot(item, e)?;
    }
    Ok(())
}

fn encode_object<W>(object: &ObjectNode, e: &mut Encoder<W>) -> Result<()>
where
    W: Write,
    W::Error: Display,
{
    trace!(len = object.len(), "map header");
    put(e.map(object.len() as u64))?;
    for (key, value) in object.iter() {
        put(e.str(key))?;
        encode_slot(value, e)?;
    }
    Ok(())
}

/// Fold a primitive write result into the crate error type.
fn put<T, E: Display>(result: std::result::Result<T, minicbor::encode::Error<E>>) -> Result<()> {
    result
        .map(|_| ())
        .map_err(|err| CborLinqError::Encode(err.to_string()))
}
