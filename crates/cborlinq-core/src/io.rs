//! Stream entry points.
//!
//! Decoding buffers the whole input before parsing, and encoding builds the
//! whole output before writing it, so the tree walk itself never blocks.

use std::io::{Read, Write};

use crate::config::DecodeOptions;
use crate::decoder::decode_with;
use crate::encoder::encode;
use crate::error::Result;
use crate::types::Node;

/// Read `reader` to its end, then decode the buffered bytes.
pub fn read_from<R: Read>(mut reader: R, options: &DecodeOptions) -> Result<Option<Node>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    decode_with(&buf, options)
}

/// Encode `node` and write the result to `writer` in one call.
pub fn write_to<W: Write>(node: &Node, mut writer: W) -> Result<()> {
    let bytes = encode(node)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
