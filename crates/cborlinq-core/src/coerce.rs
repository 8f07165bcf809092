//! Coercion between stored scalars and caller-requested native types.
//!
//! A target type implements [`FromScalar`]; [`FromNode`] lifts that to whole
//! nodes and adds `Option<T>`, which is the only way to read a null.
//!
//! | source | → `String` | → `Vec<u8>` | → numeric / `bool` |
//! |---|---|---|---|
//! | text | identity | base64 decode | invariant parse |
//! | bytes | base64 encode | identity | little-endian reinterpretation |
//! | numeric / bool | invariant text | n/a | range-checked conversion |
//! | decimal | plain text | n/a | half-even rounding, range-checked |
//! | date-time, duration, UUID, URI | canonical text | UUID only: 16 raw bytes | n/a |
//!
//! When the stored value already has the requested type it is returned as is.

use std::num::IntErrorKind;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use url::Url;
use uuid::Uuid;

use crate::canonical;
use crate::container::{ArrayNode, ObjectNode};
use crate::error::{CborLinqError, Result};
use crate::scalar::Scalar;
use crate::uri::{UriRef, UriRefError};
use crate::types::Node;

/// Conversion from a stored scalar.
pub trait FromScalar: Sized {
    /// Target type name used in error messages.
    const TARGET: &'static str;

    fn from_scalar(scalar: &Scalar) -> Result<Self>;
}

/// Conversion from a node.
pub trait FromNode: Sized {
    fn from_node(node: &Node) -> Result<Self>;
}

impl Scalar {
    /// Coerce this scalar to `T`.
    pub fn to_typed<T: FromScalar>(&self) -> Result<T> {
        T::from_scalar(self)
    }
}

fn non_scalar(node: &Node, target: &'static str) -> CborLinqError {
    let (from, reason) = match node {
        Node::Null => ("null", "null only converts to an optional type"),
        Node::Array(_) => ("array", "containers do not convert to scalars"),
        Node::Object(_) => ("object", "containers do not convert to scalars"),
        Node::Scalar(s) => (s.type_name(), "no conversion rule applies"),
    };
    CborLinqError::coercion(from, target, reason)
}

fn unsupported<T: FromScalar>(scalar: &Scalar) -> CborLinqError {
    CborLinqError::coercion(scalar.type_name(), T::TARGET, "no conversion rule applies")
}

macro_rules! from_node_via_scalar {
    ($($target:ty),* $(,)?) => {
        $(
            impl FromNode for $target {
                fn from_node(node: &Node) -> Result<Self> {
                    match node {
                        Node::Scalar(scalar) => <$target>::from_scalar(scalar),
                        other => Err(non_scalar(other, <$target as FromScalar>::TARGET)),
                    }
                }
            }

            impl FromNode for Option<$target> {
                fn from_node(node: &Node) -> Result<Self> {
                    match node {
                        Node::Null => Ok(None),
                        other => <$target>::from_node(other).map(Some),
                    }
                }
            }
        )*
    };
}

from_node_via_scalar!(
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
    NaiveDateTime,
    TimeDelta,
    Uuid,
    Url,
    UriRef,
);

// ---------------------------------------------------------------------------
// Numeric targets
// ---------------------------------------------------------------------------

/// Integral value of a numeric or decimal scalar, rounded half-to-even.
fn integral_value(scalar: &Scalar, target: &'static str) -> Result<i128> {
    if let Some(v) = scalar.as_integer() {
        return Ok(v);
    }
    match scalar {
        Scalar::F32(v) => float_to_integral(f64::from(*v), target),
        Scalar::F64(v) => float_to_integral(*v, target),
        Scalar::Decimal(v) => {
            let plain = v.to_plain_string();
            canonical::round_half_even(&plain).ok_or_else(|| CborLinqError::overflow(plain, target))
        }
        other => Err(CborLinqError::coercion(
            other.type_name(),
            target,
            "no conversion rule applies",
        )),
    }
}

fn float_to_integral(value: f64, target: &'static str) -> Result<i128> {
    let rounded = value.round_ties_even();
    // i128::MAX as f64 rounds up to 2^127, which is itself out of range.
    if !rounded.is_finite() || rounded < i128::MIN as f64 || rounded >= i128::MAX as f64 {
        return Err(CborLinqError::overflow(value, target));
    }
    Ok(rounded as i128)
}

fn parse_integer<T>(text: &str, target: &'static str) -> Result<T>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    text.trim().parse::<T>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            CborLinqError::overflow(text.trim(), target)
        }
        _ => CborLinqError::coercion("String", target, format!("{text:?} is not an integer")),
    })
}

fn exact_width<const N: usize>(bytes: &[u8], target: &'static str) -> Result<[u8; N]> {
    <[u8; N]>::try_from(bytes).map_err(|_| {
        CborLinqError::coercion(
            "Vec<u8>",
            target,
            format!("expected {N} bytes, found {}", bytes.len()),
        )
    })
}

macro_rules! integer_target {
    ($($target:ty),* $(,)?) => {
        $(
            impl FromScalar for $target {
                const TARGET: &'static str = stringify!($target);

                fn from_scalar(scalar: &Scalar) -> Result<Self> {
                    match scalar {
                        Scalar::Bool(v) => Ok(<$target>::from(*v)),
                        Scalar::Text(text) => parse_integer::<$target>(text, Self::TARGET),
                        Scalar::Bytes(bytes) => {
                            exact_width::<{ std::mem::size_of::<$target>() }>(bytes, Self::TARGET)
                                .map(<$target>::from_le_bytes)
                        }
                        other => {
                            let wide = integral_value(other, Self::TARGET)?;
                            <$target>::try_from(wide)
                                .map_err(|_| CborLinqError::overflow(wide, Self::TARGET))
                        }
                    }
                }
            }
        )*
    };
}

integer_target!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! float_target {
    ($($target:ty),* $(,)?) => {
        $(
            impl FromScalar for $target {
                const TARGET: &'static str = stringify!($target);

                fn from_scalar(scalar: &Scalar) -> Result<Self> {
                    match scalar {
                        Scalar::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
                        Scalar::I8(v) => Ok(*v as $target),
                        Scalar::I16(v) => Ok(*v as $target),
                        Scalar::I32(v) => Ok(*v as $target),
                        Scalar::I64(v) => Ok(*v as $target),
                        Scalar::U8(v) => Ok(*v as $target),
                        Scalar::U16(v) => Ok(*v as $target),
                        Scalar::U32(v) => Ok(*v as $target),
                        Scalar::U64(v) => Ok(*v as $target),
                        Scalar::F32(v) => Ok(*v as $target),
                        Scalar::F64(v) => Ok(*v as $target),
                        Scalar::Text(text) => text.trim().parse::<$target>().map_err(|_| {
                            CborLinqError::coercion(
                                "String",
                                Self::TARGET,
                                format!("{text:?} is not a number"),
                            )
                        }),
                        Scalar::Decimal(v) => v.to_plain_string().parse::<$target>().map_err(|e| {
                            CborLinqError::coercion("BigDecimal", Self::TARGET, e.to_string())
                        }),
                        Scalar::Bytes(bytes) => {
                            exact_width::<{ std::mem::size_of::<$target>() }>(bytes, Self::TARGET)
                                .map(<$target>::from_le_bytes)
                        }
                        other => Err(unsupported::<$target>(other)),
                    }
                }
            }
        )*
    };
}

float_target!(f32, f64);

impl FromScalar for bool {
    const TARGET: &'static str = "bool";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        if let Some(v) = scalar.as_integer() {
            return Ok(v != 0);
        }
        match scalar {
            Scalar::Bool(v) => Ok(*v),
            Scalar::F32(v) => Ok(*v != 0.0),
            Scalar::F64(v) => Ok(*v != 0.0),
            Scalar::Decimal(v) => Ok(*v != BigDecimal::from(0)),
            Scalar::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(CborLinqError::coercion(
                        "String",
                        Self::TARGET,
                        format!("{text:?} is not a boolean"),
                    ))
                }
            }
            Scalar::Bytes(bytes) => exact_width::<1>(bytes, Self::TARGET).map(|[b]| b != 0),
            other => Err(unsupported::<bool>(other)),
        }
    }
}

impl FromScalar for BigDecimal {
    const TARGET: &'static str = "BigDecimal";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        let parse = |text: &str, from: &'static str| {
            BigDecimal::from_str(text.trim()).map_err(|e| {
                CborLinqError::coercion(from, Self::TARGET, format!("{text:?}: {e}"))
            })
        };
        if let Some(v) = scalar.as_integer() {
            return parse(&v.to_string(), scalar.type_name());
        }
        match scalar {
            Scalar::Decimal(v) => Ok(v.clone()),
            Scalar::Bool(v) => Ok(BigDecimal::from(i32::from(*v))),
            Scalar::F32(v) if v.is_finite() => parse(&v.to_string(), "f32"),
            Scalar::F64(v) if v.is_finite() => parse(&v.to_string(), "f64"),
            Scalar::F32(v) => Err(CborLinqError::overflow(v, Self::TARGET)),
            Scalar::F64(v) => Err(CborLinqError::overflow(v, Self::TARGET)),
            Scalar::Text(text) => parse(text, "String"),
            other => Err(unsupported::<BigDecimal>(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Text and bytes
// ---------------------------------------------------------------------------

impl FromScalar for String {
    const TARGET: &'static str = "String";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        Ok(scalar.canonical_text().into_owned())
    }
}

impl FromScalar for Vec<u8> {
    const TARGET: &'static str = "Vec<u8>";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match scalar {
            Scalar::Bytes(bytes) => Ok(bytes.clone()),
            Scalar::Text(text) => BASE64.decode(text.trim()).map_err(|e| {
                CborLinqError::coercion("String", Self::TARGET, format!("invalid base64: {e}"))
            }),
            Scalar::Uuid(v) => Ok(v.as_bytes().to_vec()),
            other => Err(unsupported::<Vec<u8>>(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Date, time and identifiers
// ---------------------------------------------------------------------------

impl FromScalar for DateTime<FixedOffset> {
    const TARGET: &'static str = "DateTime<FixedOffset>";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match scalar {
            Scalar::DateTime(v) => Ok(*v),
            Scalar::NaiveDateTime(v) => Ok(canonical::resolve_local(v)),
            Scalar::Text(text) => canonical::parse_date_time(text).ok_or_else(|| {
                CborLinqError::coercion(
                    "String",
                    Self::TARGET,
                    format!("{text:?} is not a date-time"),
                )
            }),
            other => Err(unsupported::<DateTime<FixedOffset>>(other)),
        }
    }
}

impl FromScalar for NaiveDateTime {
    const TARGET: &'static str = "NaiveDateTime";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match scalar {
            Scalar::NaiveDateTime(v) => Ok(*v),
            Scalar::DateTime(v) => Ok(canonical::to_local_naive(v)),
            Scalar::Text(text) => canonical::parse_naive_date_time(text).ok_or_else(|| {
                CborLinqError::coercion(
                    "String",
                    Self::TARGET,
                    format!("{text:?} is not a date-time"),
                )
            }),
            other => Err(unsupported::<NaiveDateTime>(other)),
        }
    }
}

impl FromScalar for TimeDelta {
    const TARGET: &'static str = "TimeDelta";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match scalar {
            Scalar::Duration(v) => Ok(*v),
            Scalar::Text(text) => canonical::parse_duration(text).ok_or_else(|| {
                CborLinqError::coercion(
                    "String",
                    Self::TARGET,
                    format!("{text:?} is not a duration"),
                )
            }),
            other => Err(unsupported::<TimeDelta>(other)),
        }
    }
}

impl FromScalar for Uuid {
    const TARGET: &'static str = "Uuid";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match scalar {
            Scalar::Uuid(v) => Ok(*v),
            Scalar::Text(text) => Uuid::parse_str(text.trim())
                .map_err(|e| CborLinqError::coercion("String", Self::TARGET, e.to_string())),
            Scalar::Bytes(bytes) => Uuid::from_slice(bytes)
                .map_err(|e| CborLinqError::coercion("Vec<u8>", Self::TARGET, e.to_string())),
            other => Err(unsupported::<Uuid>(other)),
        }
    }
}

impl FromScalar for UriRef {
    const TARGET: &'static str = "UriRef";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match scalar {
            Scalar::Uri(v) => Ok(v.clone()),
            Scalar::Text(text) => text
                .trim()
                .parse()
                .map_err(|e: UriRefError| {
                    CborLinqError::coercion("String", Self::TARGET, e.to_string())
                }),
            other => Err(unsupported::<UriRef>(other)),
        }
    }
}

/// Absolute URIs only; a relative reference has no base to resolve against.
impl FromScalar for Url {
    const TARGET: &'static str = "Url";

    fn from_scalar(scalar: &Scalar) -> Result<Self> {
        match UriRef::from_scalar(scalar) {
            Ok(UriRef::Absolute(url)) => Ok(url),
            Ok(UriRef::Relative(text)) => Err(CborLinqError::coercion(
                scalar.type_name(),
                Self::TARGET,
                format!("{text:?} is a relative reference"),
            )),
            Err(CborLinqError::Coercion { from, reason, .. }) => {
                Err(CborLinqError::coercion(from, Self::TARGET, reason))
            }
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl FromNode for Node {
    fn from_node(node: &Node) -> Result<Self> {
        Ok(node.clone())
    }
}

impl FromNode for ArrayNode {
    fn from_node(node: &Node) -> Result<Self> {
        match node {
            Node::Array(array) => Ok(array.clone()),
            other => Err(CborLinqError::coercion(
                kind_name(other),
                "ArrayNode",
                "not an array",
            )),
        }
    }
}

impl FromNode for ObjectNode {
    fn from_node(node: &Node) -> Result<Self> {
        match node {
            Node::Object(object) => Ok(object.clone()),
            other => Err(CborLinqError::coercion(
                kind_name(other),
                "ObjectNode",
                "not an object",
            )),
        }
    }
}

impl FromNode for Option<ArrayNode> {
    fn from_node(node: &Node) -> Result<Self> {
        match node {
            Node::Null => Ok(None),
            other => ArrayNode::from_node(other).map(Some),
        }
    }
}

impl FromNode for Option<ObjectNode> {
    fn from_node(node: &Node) -> Result<Self> {
        match node {
            Node::Null => Ok(None),
            other => ObjectNode::from_node(other).map(Some),
        }
    }
}

fn kind_name(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Scalar(s) => s.type_name(),
        Node::Array(_) => "array",
        Node::Object(_) => "object",
    }
}
