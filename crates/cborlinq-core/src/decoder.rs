//! CBOR → tree decoder.
//!
//! The decoder peeks at each item's type through `minicbor`'s `Decoder` and
//! dispatches on it:
//!
//! - null becomes an absent slot (`None`), never a node
//! - booleans, integers, floats, text and byte strings become scalar nodes,
//!   using the widest native type for their major type (`u64` for unsigned,
//!   `i64` for negative integers, `f32`/`f64` for floats)
//! - arrays and maps nest, with definite and indefinite lengths alike
//! - tags, undefined, other simple values and stray break markers fail with
//!   [`CborLinqError::Format`] carrying the nesting depth
//!
//! Map keys must be text strings. Indefinite text and byte strings are
//! accepted and their chunks concatenated.
//!
//! # Key design decisions
//!
//! - **Break before element**: an indefinite container checks for the break
//!   marker before every element, so `[_ ]` and `{_ }` decode as empty.
//! - **No recursion**: open containers are kept on an explicit stack, so deep
//!   input cannot exhaust the thread's stack. Containers deeper than
//!   [`DecodeOptions::max_depth`] are rejected before any child is read, and
//!   the cancellation flag is polled before every item.
//! - **Capacity from input**: a declared length only pre-allocates as many
//!   slots as there are bytes left, so a forged header cannot force a huge
//!   allocation.

use indexmap::IndexMap;
use minicbor::data::Type;
use minicbor::Decoder;
use tracing::{debug, trace, warn};

use crate::config::{ConformanceMode, DecodeOptions};
use crate::container::{ArrayNode, ObjectNode};
use crate::error::{CborLinqError, Result};
use crate::scalar::Scalar;
use crate::types::Node;

/// Decode one CBOR document with the default (lax) options.
///
/// Returns `Ok(None)` when the root item is CBOR null.
pub fn decode(bytes: &[u8]) -> Result<Option<Node>> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decode one CBOR document.
///
/// The whole buffer must hold exactly one item; trailing bytes are an error in
/// strict mode and ignored (with a warning) otherwise.
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Option<Node>> {
    debug!(
        bytes = bytes.len(),
        conformance = ?options.conformance,
        "decoding CBOR document"
    );
    let mut d = Decoder::new(bytes);
    let root = read_node(&mut d, options)?;

    let trailing = bytes.len().saturating_sub(d.position());
    if trailing > 0 {
        match options.conformance {
            ConformanceMode::Strict => {
                return Err(CborLinqError::format(
                    format!("{trailing} trailing bytes after the root item"),
                    0,
                ));
            }
            ConformanceMode::Lax => warn!(trailing, "ignoring trailing bytes after the root item"),
        }
    }
    Ok(root)
}

/// Decode the item under the cursor, leaving `d` just past it.
///
/// The item is treated as a root (depth 0).
pub fn read_node(d: &mut Decoder<'_>, options: &DecodeOptions) -> Result<Option<Node>> {
    Reader { options }.read(d)
}

struct Reader<'o> {
    options: &'o DecodeOptions,
}

/// A container whose children are still being read.
enum Frame {
    Array {
        items: Vec<Option<Node>>,
        remaining: Option<u64>,
    },
    Object {
        entries: IndexMap<String, Option<Node>>,
        remaining: Option<u64>,
        key: Option<String>,
    },
}

impl Frame {
    /// Check whether the container is complete; otherwise count off the next child.
    ///
    /// `depth` is the depth of the children.
    fn at_end(&mut self, d: &mut Decoder<'_>, depth: usize) -> Result<bool> {
        let remaining = match self {
            Frame::Array { remaining, .. } => remaining,
            Frame::Object { key: Some(_), .. } => return Ok(false),
            Frame::Object { remaining, .. } => remaining,
        };
        match remaining {
            Some(0) => Ok(true),
            Some(n) => {
                *n -= 1;
                Ok(false)
            }
            None => at_break(d, depth),
        }
    }

    fn into_node(self) -> Node {
        match self {
            Frame::Array { items, .. } => Node::Array(ArrayNode::new(items)),
            Frame::Object { entries, .. } => Node::Object(ObjectNode::new(entries)),
        }
    }
}

impl Reader<'_> {
    /// Walk one item tree. Open containers live on `stack`, so nesting depth
    /// costs heap, not call stack.
    fn read(&self, d: &mut Decoder<'_>) -> Result<Option<Node>> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            let depth = stack.len();
            let finished = match stack.last_mut() {
                Some(frame) => frame.at_end(d, depth)?,
                None => false,
            };

            let value = if finished {
                stack.pop().map(Frame::into_node)
            } else {
                if let Some(Frame::Object { key: key @ None, .. }) = stack.last_mut() {
                    *key = Some(read_key(d, depth)?);
                    continue;
                }
                if self.options.is_cancelled() {
                    return Err(CborLinqError::Cancelled);
                }
                match d.datatype().map_err(malformed(depth))? {
                    Type::Array | Type::ArrayIndef => {
                        self.check_depth(depth)?;
                        stack.push(open_array(d, depth)?);
                        continue;
                    }
                    Type::Map | Type::MapIndef => {
                        self.check_depth(depth)?;
                        stack.push(open_map(d, depth)?);
                        continue;
                    }
                    ty => read_scalar(d, ty, depth)?,
                }
            };

            let depth = stack.len();
            match stack.last_mut() {
                None => return Ok(value),
                Some(Frame::Array { items, .. }) => items.push(value),
                Some(Frame::Object { entries, key, .. }) => {
                    if let Some(key) = key.take() {
                        self.insert(entries, key, value, depth)?;
                    }
                }
            }
        }
    }

    fn insert(
        &self,
        entries: &mut IndexMap<String, Option<Node>>,
        key: String,
        value: Option<Node>,
        depth: usize,
    ) -> Result<()> {
        if entries.contains_key(&key) {
            match self.options.conformance {
                ConformanceMode::Strict => {
                    return Err(CborLinqError::format(
                        format!("duplicate map key {key:?}"),
                        depth,
                    ));
                }
                ConformanceMode::Lax => {
                    warn!(key = %key, depth, "duplicate map key, keeping the last value")
                }
            }
        }
        // An existing key keeps its first position.
        entries.insert(key, value);
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.options.max_depth {
            return Err(CborLinqError::format(
                format!("nesting exceeds the maximum depth of {}", self.options.max_depth),
                depth,
            ));
        }
        Ok(())
    }
}

fn open_array(d: &mut Decoder<'_>, depth: usize) -> Result<Frame> {
    let len = d.array().map_err(malformed(depth))?;
    trace!(depth, len = ?len, "array header");
    let capacity = len.map_or(0, |n| capacity(d, n));
    Ok(Frame::Array {
        items: Vec::with_capacity(capacity),
        remaining: len,
    })
}

fn open_map(d: &mut Decoder<'_>, depth: usize) -> Result<Frame> {
    let len = d.map().map_err(malformed(depth))?;
    trace!(depth, len = ?len, "map header");
    let capacity = len.map_or(0, |n| capacity(d, n));
    Ok(Frame::Object {
        entries: IndexMap::with_capacity(capacity),
        remaining: len,
        key: None,
    })
}

fn read_key(d: &mut Decoder<'_>, depth: usize) -> Result<String> {
    match d.datatype().map_err(malformed(depth))? {
        Type::String | Type::StringIndef => read_text(d, depth),
        other => Err(CborLinqError::format(
            format!("map key must be a text string, found {other:?}"),
            depth,
        )),
    }
}

/// Read a non-container item. CBOR null reads as an absent slot.
fn read_scalar(d: &mut Decoder<'_>, ty: Type, depth: usize) -> Result<Option<Node>> {
    let scalar = match ty {
        Type::Null => {
            d.null().map_err(malformed(depth))?;
            return Ok(None);
        }
        Type::Bool => Scalar::Bool(d.bool().map_err(malformed(depth))?),
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => {
            Scalar::U64(d.u64().map_err(malformed(depth))?)
        }
        Type::I8 | Type::I16 | Type::I32 | Type::I64 => {
            Scalar::I64(d.i64().map_err(malformed(depth))?)
        }
        Type::Int => {
            return Err(CborLinqError::format(
                "integer outside the 64-bit range",
                depth,
            ));
        }
        Type::F16 => Scalar::F32(d.f16().map_err(malformed(depth))?),
        Type::F32 => Scalar::F32(d.f32().map_err(malformed(depth))?),
        Type::F64 => Scalar::F64(d.f64().map_err(malformed(depth))?),
        Type::String | Type::StringIndef => Scalar::Text(read_text(d, depth)?),
        Type::Bytes | Type::BytesIndef => Scalar::Bytes(read_bytes(d, depth)?),
        Type::Break => {
            return Err(CborLinqError::format(
                "break marker outside an indefinite-length container",
                depth,
            ));
        }
        other => {
            return Err(CborLinqError::format(
                format!("unsupported CBOR item {other:?}"),
                depth,
            ));
        }
    };
    Ok(Some(Node::Scalar(scalar)))
}

fn malformed(depth: usize) -> impl Fn(minicbor::decode::Error) -> CborLinqError {
    move |err| CborLinqError::format(err.to_string(), depth)
}

/// Consume a break marker if one is next.
fn at_break(d: &mut Decoder<'_>, depth: usize) -> Result<bool> {
    if matches!(d.datatype().map_err(malformed(depth))?, Type::Break) {
        d.set_position(d.position() + 1);
        return Ok(true);
    }
    Ok(false)
}

fn capacity(d: &Decoder<'_>, declared: u64) -> usize {
    let remaining = d.input().len().saturating_sub(d.position());
    usize::try_from(declared).unwrap_or(usize::MAX).min(remaining)
}

fn read_text(d: &mut Decoder<'_>, depth: usize) -> Result<String> {
    let mut text = String::new();
    for chunk in d.str_iter().map_err(malformed(depth))? {
        text.push_str(chunk.map_err(malformed(depth))?);
    }
    Ok(text)
}

fn read_bytes(d: &mut Decoder<'_>, depth: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for chunk in d.bytes_iter().map_err(malformed(depth))? {
        bytes.extend_from_slice(chunk.map_err(malformed(depth))?);
    }
    Ok(bytes)
}
