//! Call counting.
//!
//! A counter only sees calls that reach it. Stacked under a cache it misses
//! every cache hit; stacked above one it sees everything.

use std::cell::Cell;

use crate::error::Result;
use crate::invocable::{Arity, Invocable};
use crate::metadata::Metadata;
use crate::value::Value;

/// Transformer producing [`CountCalls`] wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter;

/// Wrapper that counts every invocation reaching it.
#[derive(Debug)]
pub struct CountCalls<I> {
    metadata: Metadata,
    inner: I,
    calls: Cell<u64>,
}

impl<I: Invocable> CountCalls<I> {
    pub fn new(inner: I) -> Self {
        Self {
            metadata: Metadata::carried_from(&inner),
            inner,
            calls: Cell::new(0),
        }
    }

    /// Number of calls that reached this wrapper so far.
    pub fn calls(&self) -> u64 {
        self.calls.get()
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Invocable> Invocable for CountCalls<I> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn arity(&self) -> Arity {
        self.inner.arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let calls = self.calls.get() + 1;
        self.calls.set(calls);
        tracing::trace!(name = %self.metadata.name, calls, "call counted");
        self.inner.call(args)
    }
}
