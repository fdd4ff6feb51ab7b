//! Stack configuration.
//!
//! A [`StackConfig`] decides which transformers are live. Each accessor
//! returns a [`Toggle`], so a disabled layer still occupies its slot in the
//! stack but passes calls straight through.
//!
//! ```rust
//! use compositional_transform::{StackConfig, Transformer};
//!
//! let config: StackConfig = serde_json::from_str(r#"{ "memo": false }"#).unwrap();
//! let stack = config.counter().over(config.memoize());
//! assert!(!config.memo);
//! # let _ = stack;
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::count::Counter;
use crate::memo::Memoize;
use crate::trace::{TraceSink, Tracer};
use crate::transformer::Toggle;

/// Default indentation unit for traced calls.
pub const DEFAULT_TRACE_PREFIX: &str = "____";

/// Which transformers are enabled, and how tracing is formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Count calls
    pub countcalls: bool,
    /// Cache results
    pub memo: bool,
    /// Trace calls
    pub trace: bool,
    /// Indentation unit repeated once per nesting level
    pub trace_prefix: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            countcalls: true,
            memo: true,
            trace: true,
            trace_prefix: DEFAULT_TRACE_PREFIX.to_string(),
        }
    }
}

impl StackConfig {
    /// Enable or disable call counting.
    pub fn with_countcalls(mut self, enabled: bool) -> Self {
        self.countcalls = enabled;
        self
    }

    /// Enable or disable result caching.
    pub fn with_memo(mut self, enabled: bool) -> Self {
        self.memo = enabled;
        self
    }

    /// Enable or disable tracing.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Set the trace indentation unit.
    pub fn with_trace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trace_prefix = prefix.into();
        self
    }

    pub fn counter(&self) -> Toggle<Counter> {
        Toggle::new(Counter, self.countcalls)
    }

    pub fn memoize(&self) -> Toggle<Memoize> {
        Toggle::new(Memoize, self.memo)
    }

    /// Tracer printing to stdout.
    pub fn tracer(&self) -> Toggle<Tracer> {
        Toggle::new(Tracer::new(self.trace_prefix.clone()), self.trace)
    }

    /// Tracer delivering lines to `sink`.
    pub fn tracer_with_sink(&self, sink: Rc<dyn TraceSink>) -> Toggle<Tracer> {
        Toggle::new(
            Tracer::new(self.trace_prefix.clone()).with_sink(sink),
            self.trace,
        )
    }
}
