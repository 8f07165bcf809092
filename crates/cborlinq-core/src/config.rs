//! Decoder configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default maximum container nesting accepted by the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// How strictly the decoder enforces CBOR well-formedness beyond the basics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConformanceMode {
    /// Duplicate map keys keep the last value; trailing bytes are ignored.
    #[default]
    Lax,
    /// Duplicate map keys and trailing bytes are format errors.
    Strict,
}

/// Shared flag for cooperative cancellation of a decode in progress.
///
/// Clones share the same flag, so one clone can be handed to the decoder and
/// another kept by whoever may want to abort it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for [`decode_with`](crate::decode_with) and [`read_from`](crate::io::read_from).
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub conformance: ConformanceMode,
    pub max_depth: usize,
    pub cancel: Option<CancelFlag>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            conformance: ConformanceMode::Lax,
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: None,
        }
    }
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self::default().with_conformance(ConformanceMode::Strict)
    }

    pub fn with_conformance(mut self, conformance: ConformanceMode) -> Self {
        self.conformance = conformance;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}
