//! Error types for node construction, coercion, and CBOR encoding/decoding.

use thiserror::Error;

/// Errors that can occur while building, converting, or (de)serializing nodes.
#[derive(Error, Debug)]
pub enum CborLinqError {
    /// The construction façade was handed a value outside the admitted scalar set.
    #[error("unsupported value type: {type_name}")]
    UnsupportedType { type_name: String },

    /// No coercion rule applies, or the source text did not parse for the target.
    #[error("cannot convert {from} to {to}: {reason}")]
    Coercion {
        from: &'static str,
        to: &'static str,
        reason: String,
    },

    /// A numeric conversion narrowed a value outside the target's range.
    #[error("value {value} does not fit in {target}")]
    Overflow { value: String, target: &'static str },

    /// The decoder met a token it does not support, at the given nesting depth.
    #[error("CBOR format error at depth {depth}: {message}")]
    Format { message: String, depth: usize },

    /// Decoding was aborted through its cancellation flag.
    #[error("decoding cancelled")]
    Cancelled,

    /// The primitive encoder reported a failure.
    #[error("CBOR encoding error: {0}")]
    Encode(String),

    /// Conversion to or from JSON failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CborLinqError {
    pub(crate) fn coercion(from: &'static str, to: &'static str, reason: impl Into<String>) -> Self {
        CborLinqError::Coercion {
            from,
            to,
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(value: impl ToString, target: &'static str) -> Self {
        CborLinqError::Overflow {
            value: value.to_string(),
            target,
        }
    }

    pub(crate) fn format(message: impl Into<String>, depth: usize) -> Self {
        CborLinqError::Format {
            message: message.into(),
            depth,
        }
    }
}

/// Convenience alias used throughout cborlinq-core.
pub type Result<T> = std::result::Result<T, CborLinqError>;
