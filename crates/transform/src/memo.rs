//! # Result Cache
//!
//! [`Memo`] keys results by the exact argument tuple it receives. Keys are
//! never normalized: under an n-ary adapter `(4, 3)` and `(4, 3, 0)` are
//! different entries even if they fold to the same value. The cache is
//! unbounded and append-only; failures are not cached.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Result, TransformError};
use crate::invocable::{Arity, Invocable};
use crate::metadata::Metadata;
use crate::value::{Key, Value};

/// Transformer producing [`Memo`] wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Memoize;

/// Wrapper caching results by argument tuple.
#[derive(Debug)]
pub struct Memo<I> {
    metadata: Metadata,
    inner: I,
    cache: RefCell<HashMap<Vec<Key>, Value>>,
}

impl<I: Invocable> Memo<I> {
    pub fn new(inner: I) -> Self {
        Self {
            metadata: Metadata::carried_from(&inner),
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn key_for(&self, args: &[Value]) -> Result<Vec<Key>> {
        args.iter()
            .map(|arg| {
                arg.to_key().ok_or_else(|| TransformError::UnhashableKey {
                    name: self.metadata.name.clone(),
                    kind: arg.unhashable_part().unwrap_or(arg).kind(),
                })
            })
            .collect()
    }

    /// Cached result for `args`, without calling through.
    pub fn get(&self, args: &[Value]) -> Option<Value> {
        let key = self.key_for(args).ok()?;
        self.cache.borrow().get(&key).cloned()
    }

    pub fn contains(&self, args: &[Value]) -> bool {
        self.get(args).is_some()
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Every cached `(arguments, result)` pair, in no particular order.
    pub fn snapshot(&self) -> Vec<(Vec<Value>, Value)> {
        self.cache
            .borrow()
            .iter()
            .map(|(key, value)| (key.iter().map(Key::to_value).collect(), value.clone()))
            .collect()
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Invocable> Invocable for Memo<I> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn arity(&self) -> Arity {
        self.inner.arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let key = self.key_for(args)?;

        // the borrow must end before calling through: recursive stacks re-enter
        let cached = self.cache.borrow().get(&key).cloned();
        if let Some(value) = cached {
            tracing::debug!(name = %self.metadata.name, "cache hit");
            return Ok(value);
        }

        tracing::debug!(name = %self.metadata.name, "cache miss");
        let value = self.inner.call(args)?;
        self.cache.borrow_mut().insert(key, value.clone());
        Ok(value)
    }
}
