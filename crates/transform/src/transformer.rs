//! # Transformers
//!
//! A [`Transformer`] takes an invocable and returns a new invocable that
//! behaves like it plus something extra. Transformers are values, so a
//! stack can be assembled, stored and toggled before anything is wrapped:
//!
//! ```text
//!   Counter.over(Memoize).over(Fold)  applied to  mul
//!   ==  countcalls(memo(n_ary(mul)))
//! ```
//!
//! ## Turning a Layer Off
//!
//! [`Disable`] is the distinguished no-op transformer: applying it returns
//! the very value it was given. Put it (or a [`Toggle`] whose flag is off)
//! in a slot of the stack to retire that layer without touching the rest.

use crate::count::{CountCalls, Counter};
use crate::error::Result;
use crate::invocable::{Arity, Invocable};
use crate::memo::{Memo, Memoize};
use crate::metadata::Metadata;
use crate::nary::{Fold, NAry};
use crate::trace::{Trace, Tracer};
use crate::value::Value;

/// Takes an invocable and returns an invocable with added behavior.
pub trait Transformer {
    /// The wrapper produced for an inner invocable of type `I`.
    type Output<I: Invocable>: Invocable;

    /// Wrap `inner`. Fails only if `inner` cannot be adapted (e.g. wrong arity).
    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>>;

    /// Stack `self` on top of `inner`: the result applies `inner` first.
    fn over<T: Transformer>(self, inner: T) -> Compose<Self, T>
    where
        Self: Sized,
    {
        Compose { outer: self, inner }
    }
}

/// Two transformers stacked; `outer` sees every call first.
#[derive(Debug, Clone, Default)]
pub struct Compose<O, N> {
    outer: O,
    inner: N,
}

impl<O: Transformer, N: Transformer> Transformer for Compose<O, N> {
    type Output<I: Invocable> = O::Output<N::Output<I>>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        self.outer.apply(self.inner.apply(inner)?)
    }
}

/// The no-op transformer: wrapping yields the identical invocable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disable;

impl Transformer for Disable {
    type Output<I: Invocable> = I;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        Ok(inner)
    }
}

/// A transformer that can be switched off, in which case it acts as [`Disable`].
#[derive(Debug, Clone)]
pub struct Toggle<T> {
    transformer: T,
    enabled: bool,
}

impl<T: Transformer> Toggle<T> {
    pub fn new(transformer: T, enabled: bool) -> Self {
        Self {
            transformer,
            enabled,
        }
    }

    pub fn enabled(transformer: T) -> Self {
        Self::new(transformer, true)
    }

    pub fn disabled(transformer: T) -> Self {
        Self::new(transformer, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<T: Transformer> Transformer for Toggle<T> {
    type Output<I: Invocable> = Switch<T::Output<I>, I>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        if self.enabled {
            Ok(Switch::On(self.transformer.apply(inner)?))
        } else {
            tracing::debug!(name = inner.name(), "transformer disabled, passing through");
            Ok(Switch::Off(inner))
        }
    }
}

/// Result of applying a [`Toggle`]: either the wrapper or the untouched inner.
#[derive(Debug, Clone)]
pub enum Switch<W, I> {
    On(W),
    Off(I),
}

impl<W, I> Switch<W, I> {
    /// The wrapper, if the toggle was enabled.
    pub fn on(&self) -> Option<&W> {
        match self {
            Switch::On(w) => Some(w),
            Switch::Off(_) => None,
        }
    }

    /// The untouched invocable, if the toggle was disabled.
    pub fn off(&self) -> Option<&I> {
        match self {
            Switch::On(_) => None,
            Switch::Off(i) => Some(i),
        }
    }
}

impl<W: Invocable, I: Invocable> Invocable for Switch<W, I> {
    fn metadata(&self) -> &Metadata {
        match self {
            Switch::On(w) => w.metadata(),
            Switch::Off(i) => i.metadata(),
        }
    }

    fn arity(&self) -> Arity {
        match self {
            Switch::On(w) => w.arity(),
            Switch::Off(i) => i.arity(),
        }
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        match self {
            Switch::On(w) => w.call(args),
            Switch::Off(i) => i.call(args),
        }
    }
}

/// Method-style wrapping for any invocable.
pub trait InvocableExt: Invocable + Sized {
    /// Count every call that reaches this layer.
    fn countcalls(self) -> CountCalls<Self> {
        CountCalls::new(self)
    }

    /// Cache results by exact argument tuple.
    fn memo(self) -> Memo<Self> {
        Memo::new(self)
    }

    /// Fold a binary invocable over one or more arguments.
    fn n_ary(self) -> Result<NAry<Self>> {
        NAry::new(self)
    }

    /// Trace calls to stdout with the given indentation unit.
    fn traced(self, prefix: impl Into<String>) -> Trace<Self> {
        Tracer::new(prefix).wrap(self)
    }

    /// Apply an arbitrary transformer.
    fn with<T: Transformer>(self, transformer: &T) -> Result<T::Output<Self>> {
        transformer.apply(self)
    }
}

impl<I: Invocable> InvocableExt for I {}

/// Wrap `inner` in a call counter.
pub fn countcalls<I: Invocable>(inner: I) -> CountCalls<I> {
    CountCalls::new(inner)
}

/// Wrap `inner` in a result cache.
pub fn memo<I: Invocable>(inner: I) -> Memo<I> {
    Memo::new(inner)
}

/// Adapt a binary `inner` to one-or-more arguments.
pub fn n_ary<I: Invocable>(inner: I) -> Result<NAry<I>> {
    NAry::new(inner)
}

/// Build a tracing transformer with the given indentation unit.
pub fn trace(prefix: impl Into<String>) -> Tracer {
    Tracer::new(prefix)
}

/// The no-op transformer.
pub fn disable() -> Disable {
    Disable
}

impl Transformer for Counter {
    type Output<I: Invocable> = CountCalls<I>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        Ok(CountCalls::new(inner))
    }
}

impl Transformer for Memoize {
    type Output<I: Invocable> = Memo<I>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        Ok(Memo::new(inner))
    }
}

impl Transformer for Fold {
    type Output<I: Invocable> = NAry<I>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        NAry::new(inner)
    }
}

impl Transformer for Tracer {
    type Output<I: Invocable> = Trace<I>;

    fn apply<I: Invocable>(&self, inner: I) -> Result<Self::Output<I>> {
        Ok(self.wrap(inner))
    }
}
