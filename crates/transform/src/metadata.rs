//! Identity metadata carried by every invocable.
//!
//! Wrappers never invent a label of their own: at wrap time they copy the
//! name and description of whatever they wrap, so a stack of five
//! transformers still introspects as the base function.

use crate::error::Result;
use crate::invocable::{Arity, Invocable};
use crate::transformer::Transformer;
use crate::value::Value;

/// Name and optional description of an invocable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub name: String,
    pub description: Option<String>,
}

impl Metadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Metadata for a wrapper around `wrapped`.
    pub fn carried_from<I: Invocable + ?Sized>(wrapped: &I) -> Self {
        wrapped.metadata().clone()
    }
}

/// Transformer that only carries metadata across a pass-through wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preserve;

/// Pass-through wrapper produced by [`Preserve`].
#[derive(Debug, Clone)]
pub struct Preserved<I> {
    metadata: Metadata,
    inner: I,
}

impl<I: Invocable> Preserved<I> {
    pub fn new(inner: I) -> Self {
        Self {
            metadata: Metadata::carried_from(&inner),
            inner,
        }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Invocable> Invocable for Preserved<I> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn arity(&self) -> Arity {
        self.inner.arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        self.inner.call(args)
    }
}

impl Transformer for Preserve {
    type Output<I: Invocable> = Preserved<I>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        Ok(Preserved::new(inner))
    }
}
