//! # Call Tracing
//!
//! [`Trace`] emits one line when a call enters and one when it returns,
//! indented by the tracer's prefix repeated once per level of nesting:
//!
//! ```text
//!  --> fib(3)
//! ____ --> fib(2)
//! ________ --> fib(1)
//! ________ <-- fib(1) == 1
//! ________ --> fib(0)
//! ________ <-- fib(0) == 1
//! ____ <-- fib(2) == 2
//! ____ --> fib(1)
//! ____ <-- fib(1) == 1
//!  <-- fib(3) == 3
//! ```
//!
//! Nesting only shows up when recursive calls re-enter the same wrapper,
//! i.e. when the base function recurses through a [`crate::Recur`] handle.
//!
//! ## Sinks
//!
//! Lines are handed to a [`TraceSink`]. The default prints to stdout;
//! [`RecordingSink`] keeps them for inspection, [`LogSink`] forwards them to
//! `tracing`, and [`CompositeSink`] fans out to several sinks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::invocable::{Arity, Invocable};
use crate::metadata::Metadata;
use crate::value::{join_args, Value};

// ============================================================================
// Trace Lines
// ============================================================================

/// What a trace line reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceKind {
    Enter,
    /// Display form of the returned value.
    Return(String),
    /// Display form of the failure.
    Fail(String),
}

/// One emitted trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub depth: usize,
    pub indent: String,
    pub name: String,
    pub args: String,
    pub kind: TraceKind,
}

impl TraceLine {
    pub fn is_enter(&self) -> bool {
        self.kind == TraceKind::Enter
    }
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TraceKind::Enter => write!(f, "{} --> {}({})", self.indent, self.name, self.args),
            TraceKind::Return(result) => write!(
                f,
                "{} <-- {}({}) == {}",
                self.indent, self.name, self.args, result
            ),
            TraceKind::Fail(error) => write!(
                f,
                "{} <-- {}({}) !! {}",
                self.indent, self.name, self.args, error
            ),
        }
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination for trace lines.
pub trait TraceSink {
    fn record(&self, line: &TraceLine);
}

/// Prints every line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl TraceSink for StdoutSink {
    fn record(&self, line: &TraceLine) {
        println!("{}", line);
    }
}

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&self, _line: &TraceLine) {}
}

/// Forwards lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&self, line: &TraceLine) {
        tracing::info!(depth = line.depth, name = %line.name, "{}", line);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: RefCell<Vec<TraceLine>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines, rendered.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().iter().map(ToString::to_string).collect()
    }

    /// Recorded lines, structured.
    pub fn events(&self) -> Vec<TraceLine> {
        self.lines.borrow().clone()
    }

    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, line: &TraceLine) {
        self.lines.borrow_mut().push(line.clone());
    }
}

/// Delivers each line to several sinks, in order.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Rc<dyn TraceSink>>,
}

impl CompositeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Rc<dyn TraceSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl TraceSink for CompositeSink {
    fn record(&self, line: &TraceLine) {
        for sink in &self.sinks {
            sink.record(line);
        }
    }
}

// ============================================================================
// Tracer
// ============================================================================

/// Transformer producing [`Trace`] wrappers that share one sink.
#[derive(Clone)]
pub struct Tracer {
    prefix: String,
    sink: Rc<dyn TraceSink>,
}

impl Tracer {
    /// Tracer printing to stdout, indenting with `prefix` per level.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sink: Rc::new(StdoutSink),
        }
    }

    pub fn with_sink(mut self, sink: Rc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Wrap `inner`; each wrapper gets its own depth counter.
    pub fn wrap<I: Invocable>(&self, inner: I) -> Trace<I> {
        Trace {
            metadata: Metadata::carried_from(&inner),
            inner,
            prefix: self.prefix.clone(),
            depth: Cell::new(0),
            sink: Rc::clone(&self.sink),
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Restores the depth when a traced call leaves, including by unwinding.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
    restore: usize,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.restore);
    }
}

/// Wrapper emitting enter/exit lines around each call.
pub struct Trace<I> {
    metadata: Metadata,
    inner: I,
    prefix: String,
    depth: Cell<usize>,
    sink: Rc<dyn TraceSink>,
}

impl<I> Trace<I> {
    /// Current nesting depth; zero whenever no call is in progress.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }

    fn line(&self, depth: usize, args: &str, kind: TraceKind) -> TraceLine {
        TraceLine {
            depth,
            indent: self.prefix.repeat(depth),
            name: self.metadata.name.clone(),
            args: args.to_string(),
            kind,
        }
    }
}

impl<I: Invocable> Invocable for Trace<I> {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn arity(&self) -> Arity {
        self.inner.arity()
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let depth = self.depth.get();
        let args_text = join_args(args);
        self.sink.record(&self.line(depth, &args_text, TraceKind::Enter));

        let outcome = {
            let _guard = DepthGuard {
                depth: &self.depth,
                restore: depth,
            };
            self.depth.set(depth + 1);
            self.inner.call(args)
        };

        let kind = match &outcome {
            Ok(value) => TraceKind::Return(value.to_string()),
            Err(err) => TraceKind::Fail(err.to_string()),
        };
        self.sink.record(&self.line(depth, &args_text, kind));
        outcome
    }
}

impl<I: fmt::Debug> fmt::Debug for Trace<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trace")
            .field("metadata", &self.metadata)
            .field("inner", &self.inner)
            .field("prefix", &self.prefix)
            .field("depth", &self.depth.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use crate::error::TransformError;
    use crate::invocable::Function;

    fn recording(prefix: &str) -> (Tracer, Rc<RecordingSink>) {
        let sink = Rc::new(RecordingSink::new());
        let tracer = Tracer::new(prefix).with_sink(sink.clone());
        (tracer, sink)
    }

    #[test]
    fn test_flat_call_format() {
        let (tracer, sink) = recording("..");
        let add = tracer.wrap(Function::binary("add", |a, b| {
            Ok(Value::Int(a.as_int()? + b.as_int()?))
        }));

        assert_eq!(add.call(&[Value::Int(4), Value::Int(3)]), Ok(Value::Int(7)));
        assert_eq!(sink.lines(), vec![" --> add(4, 3)", " <-- add(4, 3) == 7"]);
        assert_eq!(add.depth(), 0);
    }

    #[test]
    fn test_failure_restores_depth_and_closes_line() {
        let (tracer, sink) = recording("__");
        let boom = tracer.wrap(Function::unary("boom", |_| {
            Err(TransformError::failed("exploded"))
        }));

        let err = boom.call(&[Value::from("x")]).unwrap_err();
        assert_eq!(err, TransformError::failed("exploded"));
        assert_eq!(boom.depth(), 0);
        assert_eq!(
            sink.lines(),
            vec![" --> boom(x)", " <-- boom(x) !! exploded"]
        );

        // a later call starts from depth zero again
        sink.clear();
        let _ = boom.call(&[Value::Int(1)]);
        assert_eq!(sink.events()[0].depth, 0);
    }

    #[test]
    fn test_depth_restored_after_panic() {
        let (tracer, _sink) = recording("__");
        let panicky = tracer.wrap(Function::unary("panicky", |_| panic!("inner panic")));

        let result = catch_unwind(AssertUnwindSafe(|| panicky.call(&[Value::Nil])));
        assert!(result.is_err());
        assert_eq!(panicky.depth(), 0);
    }

    #[test]
    fn test_carries_metadata_and_arity() {
        let (tracer, _) = recording("");
        let f = tracer.wrap(Function::unary("id", |x| Ok(x.clone())).with_description("Identity"));
        assert_eq!(f.name(), "id");
        assert_eq!(f.description(), Some("Identity"));
        assert_eq!(f.arity(), Arity::Exact(1));
        assert_eq!(f.prefix(), "");
    }

    #[test]
    fn test_composite_sink_fans_out() {
        let a = Rc::new(RecordingSink::new());
        let b = Rc::new(RecordingSink::new());
        let composite = CompositeSink::new().with(a.clone()).with(b.clone());
        let tracer = Tracer::new("  ").with_sink(Rc::new(composite));
        let f = tracer.wrap(Function::variadic("nil", |_| Ok(Value::Nil)));

        f.call(&[]).unwrap();
        assert_eq!(a.lines(), b.lines());
        assert_eq!(a.lines(), vec![" --> nil()", " <-- nil() == nil"]);
    }

    #[test]
    fn test_null_sink_still_traces_depth() {
        let f = Tracer::new("-")
            .with_sink(Rc::new(NullSink))
            .wrap(Function::variadic("noop", |_| Ok(Value::Nil)));
        assert_eq!(f.call(&[]), Ok(Value::Nil));
        assert_eq!(f.depth(), 0);
    }
}
