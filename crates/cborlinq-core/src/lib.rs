//! # cborlinq-core
//!
//! An in-memory node model for **CBOR** (RFC 8949) documents, in the spirit of
//! a JSON DOM: build a tree from native Rust values, read values back with
//! typed coercion, and convert whole trees to and from CBOR bytes.
//!
//! ## Quick start
//!
//! ```rust
//! use cborlinq_core::{create, create_array, create_object, decode, encode, Node, NodeKind};
//!
//! // Native values → node tree
//! let tree = Node::from(create_object([
//!     ("name", create("Alice")),
//!     ("age", create(30u8)),
//!     ("scores", create(create_array([95i32, 87, 92]))),
//!     ("nickname", None),
//! ]));
//!
//! // Tree → CBOR → tree
//! let bytes = encode(&tree).unwrap();
//! let back = decode(&bytes).unwrap().unwrap();
//!
//! // Integer widths widen on the way back, but the data model is intact
//! assert!(back.equivalent(&tree));
//! let object = back.as_object().unwrap();
//! assert_eq!(object.get("age").unwrap().to_typed::<u8>().unwrap(), 30);
//! assert_eq!(object.get("scores").unwrap().kind(), NodeKind::Array);
//! assert!(object.get("nickname").is_none());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: `Node`, `NodeKind` and the borrowed `Native` view
//! - [`scalar`]: the closed set of scalar payloads
//! - [`container`]: `ArrayNode` and `ObjectNode`
//! - [`create`]: construction façade (`create`, `create_array`, `create_object`, `create_any`)
//! - [`coerce`]: typed reads through `FromNode` / `FromScalar`
//! - [`encoder`] / [`decoder`]: tree ⇄ CBOR bytes
//! - [`config`]: decoder options (conformance, depth limit, cancellation)
//! - [`io`]: buffered stream helpers
//! - [`json`]: serde serialization and the JSON bridge
//! - [`canonical`]: locale-independent text forms
//! - [`uri`]: absolute and relative URI references
//! - [`error`]: error type

pub mod canonical;
pub mod coerce;
pub mod config;
pub mod container;
pub mod create;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod io;
pub mod json;
pub mod scalar;
pub mod types;
pub mod uri;

pub use coerce::{FromNode, FromScalar};
pub use config::{CancelFlag, ConformanceMode, DecodeOptions};
pub use container::{ArrayNode, ObjectNode};
pub use create::{create, create_any, create_array, create_object, create_value, IntoNode};
pub use decoder::{decode, decode_with};
pub use encoder::encode;
pub use error::{CborLinqError, Result};
pub use scalar::{Scalar, ScalarKind};
pub use types::{Native, Node, NodeKind};
pub use uri::UriRef;
