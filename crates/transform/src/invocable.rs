//! # Invocables
//!
//! An [`Invocable`] is anything callable with an ordered argument sequence
//! that produces a [`Value`]. Base computations are [`Function`]s; every
//! transformer in this crate produces a wrapper struct that owns exactly one
//! inner invocable plus its own state.
//!
//! ## Recursion Through the Whole Stack
//!
//! A recursive base function must not call itself directly: it would skip
//! every transformer wrapped around it. Instead [`fix`] hands the base
//! computation a [`Recur`] handle, builds the stack, moves it into an `Rc`
//! and only then binds the handle to it. Each recursive descent therefore
//! re-enters the counters, tracers and caches above the base.
//!
//! ```rust
//! use compositional_transform::{fix, Function, InvocableExt, Invocable, Value};
//!
//! let fib = fix(|this| {
//!     Function::unary("fib", move |n| {
//!         let n = n.as_int()?;
//!         if n <= 1 {
//!             return Ok(Value::Int(1));
//!         }
//!         let a = this.call(&[Value::Int(n - 1)])?.as_int()?;
//!         let b = this.call(&[Value::Int(n - 2)])?.as_int()?;
//!         Ok(Value::Int(a + b))
//!     })
//!     .memo()
//!     .countcalls()
//! });
//!
//! assert_eq!(fib.call(&[Value::Int(10)]).unwrap(), Value::Int(89));
//! assert_eq!(fib.calls(), 19);
//! ```

use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Result, TransformError};
use crate::metadata::Metadata;
use crate::value::Value;

/// Number of arguments an invocable accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    /// Any number of arguments, including none.
    pub const VARIADIC: Arity = Arity::AtLeast(0);

    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// Fail with `ArityMismatch` unless `count` is accepted.
    pub fn check(&self, name: &str, count: usize) -> Result<()> {
        if self.accepts(count) {
            Ok(())
        } else {
            Err(TransformError::ArityMismatch {
                name: name.to_string(),
                expected: self.to_string(),
                got: count,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Something callable with an ordered argument sequence.
///
/// Implementations must not hold interior borrows across the call to an
/// inner invocable: recursive stacks re-enter the same wrapper while an
/// outer call on it is still in progress.
pub trait Invocable {
    /// Identity of this invocable.
    fn metadata(&self) -> &Metadata;

    /// Accepted argument counts. Wrappers report what their caller may pass.
    fn arity(&self) -> Arity {
        Arity::VARIADIC
    }

    /// Invoke with the given arguments.
    fn call(&self, args: &[Value]) -> Result<Value>;

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn description(&self) -> Option<&str> {
        self.metadata().description.as_deref()
    }
}

impl<I: Invocable + ?Sized> Invocable for &I {
    fn metadata(&self) -> &Metadata {
        (**self).metadata()
    }

    fn arity(&self) -> Arity {
        (**self).arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        (**self).call(args)
    }
}

impl<I: Invocable + ?Sized> Invocable for Box<I> {
    fn metadata(&self) -> &Metadata {
        (**self).metadata()
    }

    fn arity(&self) -> Arity {
        (**self).arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        (**self).call(args)
    }
}

impl<I: Invocable + ?Sized> Invocable for Rc<I> {
    fn metadata(&self) -> &Metadata {
        (**self).metadata()
    }

    fn arity(&self) -> Arity {
        (**self).arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        (**self).call(args)
    }
}

type Body = Box<dyn Fn(&[Value]) -> Result<Value>>;

/// A terminal computation built from a closure.
pub struct Function {
    metadata: Metadata,
    arity: Arity,
    body: Body,
}

impl Function {
    /// Create a function that accepts `arity` arguments.
    pub fn new(
        name: impl Into<String>,
        arity: Arity,
        body: impl Fn(&[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Self {
            metadata: Metadata::new(name),
            arity,
            body: Box::new(body),
        }
    }

    /// Create a function accepting any number of arguments.
    pub fn variadic(
        name: impl Into<String>,
        body: impl Fn(&[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Self::new(name, Arity::VARIADIC, body)
    }

    pub fn unary(
        name: impl Into<String>,
        body: impl Fn(&Value) -> Result<Value> + 'static,
    ) -> Self {
        Self::new(name, Arity::Exact(1), move |args| body(&args[0]))
    }

    pub fn binary(
        name: impl Into<String>,
        body: impl Fn(&Value, &Value) -> Result<Value> + 'static,
    ) -> Self {
        Self::new(name, Arity::Exact(2), move |args| body(&args[0], &args[1]))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }
}

impl Invocable for Function {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        self.arity.check(&self.metadata.name, args.len())?;
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("metadata", &self.metadata)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Late-bound handle to a fully wrapped invocable, for recursive bodies.
///
/// Obtained from [`fix`] or [`try_fix`]. Holds a weak reference, so a stack
/// that refers to itself through a `Recur` is still freed when its last
/// `Rc` is dropped.
#[derive(Clone)]
pub struct Recur {
    slot: Rc<OnceCell<Weak<dyn Invocable>>>,
}

impl Recur {
    /// Call the fully wrapped invocable this handle is bound to.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        let target = self
            .slot
            .get()
            .and_then(Weak::upgrade)
            .ok_or(TransformError::Unbound)?;
        target.call(args)
    }

    /// Whether the target is alive (false while the stack is still being built).
    pub fn is_bound(&self) -> bool {
        self.slot
            .get()
            .is_some_and(|target| target.strong_count() > 0)
    }
}

impl fmt::Debug for Recur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recur")
            .field("bound", &self.is_bound())
            .finish()
    }
}

fn bind<I: Invocable + 'static>(slot: &OnceCell<Weak<dyn Invocable>>, stack: I) -> Rc<I> {
    let stack = Rc::new(stack);
    let weak: Weak<I> = Rc::downgrade(&stack);
    let target: Weak<dyn Invocable> = weak;
    // the slot is fresh, so this is its only assignment
    let _ = slot.set(target);
    stack
}

/// Build a self-referential invocable.
///
/// `build` receives a [`Recur`] handle that, once construction finishes,
/// points at the value `build` returned, including every transformer it
/// applied. Calling the handle during `build` fails with `Unbound`.
pub fn fix<I, F>(build: F) -> Rc<I>
where
    I: Invocable + 'static,
    F: FnOnce(Recur) -> I,
{
    let slot = Rc::new(OnceCell::new());
    let stack = build(Recur {
        slot: Rc::clone(&slot),
    });
    bind(&slot, stack)
}

/// [`fix`] for stacks whose construction can fail, e.g. through [`crate::Transformer::apply`].
pub fn try_fix<I, F>(build: F) -> Result<Rc<I>>
where
    I: Invocable + 'static,
    F: FnOnce(Recur) -> Result<I>,
{
    let slot = Rc::new(OnceCell::new());
    let stack = build(Recur {
        slot: Rc::clone(&slot),
    })?;
    Ok(bind(&slot, stack))
}
