//! # Error Types
//!
//! Every transformer propagates failures unchanged: nothing here is retried
//! or swallowed. A failure raised by a base computation travels up through
//! counters, caches and tracers exactly as it was produced.

use thiserror::Error;

/// Errors raised while invoking (or wrapping) an invocable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// An argument cannot serve as a cache key.
    #[error("unhashable argument of kind {kind} passed to memoized '{name}'")]
    UnhashableKey { name: String, kind: &'static str },

    /// An n-ary adapter was called without any argument.
    #[error("'{name}' requires at least one argument, got none")]
    ArityError { name: String },

    /// An invocable received (or would receive) an unsupported argument count.
    #[error("'{name}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: String,
        got: usize,
    },

    /// A value had the wrong kind for the operation that consumed it.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// A recursive self-handle was used while its target was not alive.
    #[error("recursive self-handle is not bound to a live invocable")]
    Unbound,

    /// Failure raised by a base computation.
    #[error("{message}")]
    Failed { message: String },
}

impl TransformError {
    /// Shorthand for a base-computation failure.
    pub fn failed(message: impl Into<String>) -> Self {
        TransformError::Failed {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TransformError>;
