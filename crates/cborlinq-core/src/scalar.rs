//! Scalar payloads: the closed set of native values a node may wrap.
//!
//! The enum discriminant doubles as the scalar-kind tag, so classifying a
//! scalar is a field read rather than a runtime type test.

use std::borrow::Cow;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeDelta, Utc};
use url::Url;
use uuid::Uuid;

use crate::canonical;
use crate::uri::UriRef;
use crate::types::NodeKind;

/// One native scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(BigDecimal),
    /// Date-time carrying an explicit UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Date-time with no zone information.
    NaiveDateTime(NaiveDateTime),
    Duration(TimeDelta),
    Uuid(Uuid),
    /// URI reference, absolute or relative.
    Uri(UriRef),
}

/// The native type tag of a [`Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Text,
    Bytes,
    Decimal,
    DateTime,
    NaiveDateTime,
    Duration,
    Uuid,
    Uri,
}

impl ScalarKind {
    /// Semantic classification reported by nodes wrapping this kind.
    ///
    /// Decimal, date-time, duration, UUID and URI values are carried as CBOR
    /// text, so they classify as [`NodeKind::String`].
    pub fn node_kind(self) -> NodeKind {
        match self {
            ScalarKind::Bool => NodeKind::Boolean,
            ScalarKind::I8
            | ScalarKind::I16
            | ScalarKind::I32
            | ScalarKind::I64
            | ScalarKind::U8
            | ScalarKind::U16
            | ScalarKind::U32
            | ScalarKind::U64 => NodeKind::Integer,
            ScalarKind::F32 | ScalarKind::F64 => NodeKind::Float,
            ScalarKind::Bytes => NodeKind::Bytes,
            ScalarKind::Text
            | ScalarKind::Decimal
            | ScalarKind::DateTime
            | ScalarKind::NaiveDateTime
            | ScalarKind::Duration
            | ScalarKind::Uuid
            | ScalarKind::Uri => NodeKind::String,
        }
    }

    /// Rust type name of the payload, used in diagnostics and errors.
    pub fn type_name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Text => "String",
            ScalarKind::Bytes => "Vec<u8>",
            ScalarKind::Decimal => "BigDecimal",
            ScalarKind::DateTime => "DateTime<FixedOffset>",
            ScalarKind::NaiveDateTime => "NaiveDateTime",
            ScalarKind::Duration => "TimeDelta",
            ScalarKind::Uuid => "Uuid",
            ScalarKind::Uri => "UriRef",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl Scalar {
    pub fn scalar_kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
            Scalar::Text(_) => ScalarKind::Text,
            Scalar::Bytes(_) => ScalarKind::Bytes,
            Scalar::Decimal(_) => ScalarKind::Decimal,
            Scalar::DateTime(_) => ScalarKind::DateTime,
            Scalar::NaiveDateTime(_) => ScalarKind::NaiveDateTime,
            Scalar::Duration(_) => ScalarKind::Duration,
            Scalar::Uuid(_) => ScalarKind::Uuid,
            Scalar::Uri(_) => ScalarKind::Uri,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.scalar_kind().node_kind()
    }

    pub fn type_name(&self) -> &'static str {
        self.scalar_kind().type_name()
    }

    /// The value of any integer-kind scalar, widened losslessly.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Scalar::I8(v) => Some(v.into()),
            Scalar::I16(v) => Some(v.into()),
            Scalar::I32(v) => Some(v.into()),
            Scalar::I64(v) => Some(v.into()),
            Scalar::U8(v) => Some(v.into()),
            Scalar::U16(v) => Some(v.into()),
            Scalar::U32(v) => Some(v.into()),
            Scalar::U64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Canonical, locale-independent text for this value.
    ///
    /// Byte buffers render as standard base64. Unzoned date-times are pinned
    /// to the host's local offset first.
    pub fn canonical_text(&self) -> Cow<'_, str> {
        let text = match self {
            Scalar::Bool(v) => v.to_string(),
            Scalar::I8(v) => v.to_string(),
            Scalar::I16(v) => v.to_string(),
            Scalar::I32(v) => v.to_string(),
            Scalar::I64(v) => v.to_string(),
            Scalar::U8(v) => v.to_string(),
            Scalar::U16(v) => v.to_string(),
            Scalar::U32(v) => v.to_string(),
            Scalar::U64(v) => v.to_string(),
            Scalar::F32(v) => v.to_string(),
            Scalar::F64(v) => v.to_string(),
            Scalar::Text(v) => return Cow::Borrowed(v),
            Scalar::Bytes(v) => BASE64.encode(v),
            Scalar::Decimal(v) => v.to_plain_string(),
            Scalar::DateTime(v) => canonical::format_date_time(v),
            Scalar::NaiveDateTime(v) => canonical::format_date_time(&canonical::resolve_local(v)),
            Scalar::Duration(v) => canonical::format_duration(v),
            Scalar::Uuid(v) => v.hyphenated().to_string(),
            Scalar::Uri(v) => return Cow::Borrowed(v.as_str()),
        };
        Cow::Owned(text)
    }

    /// Whether this scalar is written to the wire as a CBOR text string.
    pub fn is_text_like(&self) -> bool {
        self.kind() == NodeKind::String
    }
}

/// Wire-level view of a scalar: what a decoder would see after encoding it.
#[derive(Debug, PartialEq)]
pub(crate) enum WireScalar<'a> {
    Bool(bool),
    Int(i128),
    F32(u32),
    F64(u64),
    Text(Cow<'a, str>),
    Bytes(&'a [u8]),
}

impl Scalar {
    pub(crate) fn wire_form(&self) -> WireScalar<'_> {
        if let Some(v) = self.as_integer() {
            return WireScalar::Int(v);
        }
        match self {
            Scalar::Bool(v) => WireScalar::Bool(*v),
            Scalar::F32(v) => WireScalar::F32(v.to_bits()),
            Scalar::F64(v) => WireScalar::F64(v.to_bits()),
            Scalar::Bytes(v) => WireScalar::Bytes(v),
            other => WireScalar::Text(other.canonical_text()),
        }
    }
}

fn short_hex(bytes: &[u8]) -> String {
    if bytes.len() > 8 {
        format!("{}...", hex::encode(&bytes[..8]))
    } else {
        hex::encode(bytes)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Text(v) => write!(f, "{v:?}"),
            Scalar::Bytes(v) => write!(f, "{} [bytes; {}]", short_hex(v), v.len()),
            other => write!(f, "{} [{}]", other.canonical_text(), other.type_name()),
        }
    }
}

macro_rules! scalar_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Scalar {
                fn from(value: $source) -> Self {
                    Scalar::$variant(value)
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Text,
    Vec<u8> => Bytes,
    BigDecimal => Decimal,
    DateTime<FixedOffset> => DateTime,
    NaiveDateTime => NaiveDateTime,
    TimeDelta => Duration,
    Uuid => Uuid,
    UriRef => Uri,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

impl From<&[u8]> for Scalar {
    fn from(value: &[u8]) -> Self {
        Scalar::Bytes(value.to_vec())
    }
}

impl From<Url> for Scalar {
    fn from(value: Url) -> Self {
        Scalar::Uri(UriRef::Absolute(value))
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::DateTime(value.fixed_offset())
    }
}

impl From<DateTime<Local>> for Scalar {
    fn from(value: DateTime<Local>) -> Self {
        Scalar::DateTime(value.fixed_offset())
    }
}
