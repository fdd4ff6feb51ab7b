//! # Compositional Transform
//!
//! Function transformers that stack: each takes an invocable and returns a
//! new invocable with one added behavior, keeping the original's name and
//! description.
//!
//! - **Counting**: [`CountCalls`] counts the calls that reach it
//! - **Caching**: [`Memo`] caches results by exact argument tuple
//! - **Folding**: [`NAry`] turns a binary invocable into a one-or-more one
//! - **Tracing**: [`Trace`] emits nested enter/exit lines
//! - **Disabling**: [`Disable`] and [`Toggle`] retire a layer in place
//!
//! ## Order Matters
//!
//! A call travels the stack from the outside in, and any layer may stop it
//! early. A counter under a cache never sees cache hits; a counter over a
//! cache sees every call:
//!
//! ```rust
//! use compositional_transform::{Function, InvocableExt, Invocable, Value};
//!
//! let add = || Function::binary("add", |a, b| Ok(Value::Int(a.as_int()? + b.as_int()?)));
//! let args = [Value::Int(4), Value::Int(3)];
//!
//! let cache_outside = add().countcalls().memo();
//! cache_outside.call(&args).unwrap();
//! cache_outside.call(&args).unwrap();
//! assert_eq!(cache_outside.inner().calls(), 1);
//!
//! let counter_outside = add().memo().countcalls();
//! counter_outside.call(&args).unwrap();
//! counter_outside.call(&args).unwrap();
//! assert_eq!(counter_outside.calls(), 2);
//! ```
//!
//! Recursive functions re-enter the whole stack only if they recurse
//! through the handle given by [`fix`].
//!
//! ## Threading
//!
//! Wrapper state lives in `Cell`/`RefCell`, so wrapped invocables are not
//! `Sync`; each stack belongs to one thread.

pub mod config;
pub mod count;
pub mod error;
pub mod invocable;
pub mod memo;
pub mod metadata;
pub mod nary;
pub mod trace;
pub mod transformer;
pub mod value;

// Re-export key types at crate root for convenience
pub use config::{StackConfig, DEFAULT_TRACE_PREFIX};
pub use count::{CountCalls, Counter};
pub use error::{Result, TransformError};
pub use invocable::{fix, try_fix, Arity, Function, Invocable, Recur};
pub use memo::{Memo, Memoize};
pub use metadata::{Metadata, Preserve, Preserved};
pub use nary::{Fold, NAry};
pub use trace::{
    CompositeSink, LogSink, NullSink, RecordingSink, StdoutSink, Trace, TraceKind, TraceLine,
    TraceSink, Tracer,
};
pub use transformer::{
    countcalls, disable, memo, n_ary, trace, Compose, Disable, InvocableExt, Switch, Toggle,
    Transformer,
};
pub use value::{join_args, Key, Value};
