//! N-ary adaptation of binary invocables.
//!
//! `w(x) = x`, `w(x, y) = f(x, y)`, `w(x, y, z, ...) = f(x, w(y, z, ...))`.
//! The fold stays inside the adapter, never re-entering whatever wraps it, so
//! a counter stacked above sees one call per top-level invocation. It runs
//! as a loop from the last pair backwards, so argument count is not bounded
//! by stack depth.

use crate::error::{Result, TransformError};
use crate::invocable::{Arity, Invocable};
use crate::metadata::Metadata;
use crate::value::Value;

/// Transformer producing [`NAry`] wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fold;

/// Right-associative fold of a binary invocable.
#[derive(Debug)]
pub struct NAry<I> {
    metadata: Metadata,
    inner: I,
}

impl<I: Invocable> NAry<I> {
    /// Fails with `ArityMismatch` if `inner` declares it cannot take two arguments.
    pub fn new(inner: I) -> Result<Self> {
        inner.arity().check(inner.name(), 2)?;
        Ok(Self {
            metadata: Metadata::carried_from(&inner),
            inner,
        })
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Invocable> Invocable for NAry<I> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match args {
            [] => Err(TransformError::ArityError {
                name: self.metadata.name.clone(),
            }),
            [init @ .., last] => {
                let mut folded = last.clone();
                for (remaining, x) in init.iter().enumerate().rev() {
                    tracing::trace!(name = %self.metadata.name, remaining, "folding");
                    folded = self.inner.call(&[x.clone(), folded])?;
                }
                Ok(folded)
            }
        }
    }
}
