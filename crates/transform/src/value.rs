//! # Values and Argument Keys
//!
//! Invocables exchange dynamically typed [`Value`]s. An argument tuple is a
//! plain `&[Value]` slice; when a cache needs it as a map key it is lowered
//! into a `Vec<Key>`, which only succeeds if every element is hashable.
//!
//! | Kind    | Hashable | Display      |
//! |---------|----------|--------------|
//! | `Nil`   | yes      | `nil`        |
//! | `Bool`  | yes      | `true`       |
//! | `Int`   | yes      | `7`          |
//! | `Float` | yes      | `2.5`        |
//! | `Str`   | yes      | `abc`        |
//! | `Tuple` | if all elements are | `(1, 2)` |
//! | `List`  | never    | `[1, 2]`     |

use std::fmt;

use crate::error::{Result, TransformError};

/// A dynamically typed value passed to and returned from invocables.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Immutable sequence; hashable when its elements are.
    Tuple(Vec<Value>),
    /// Mutable-by-convention sequence; never usable as a cache key.
    List(Vec<Value>),
}

impl Value {
    /// Name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch("int", other)),
        }
    }

    /// Numeric view: integers widen to floats.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(mismatch("float", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("str", other)),
        }
    }

    /// Lower this value into a hashable key, or `None` if it contains a list.
    pub fn to_key(&self) -> Option<Key> {
        Some(match self {
            Value::Nil => Key::Nil,
            Value::Bool(b) => Key::Bool(*b),
            Value::Int(i) => Key::Int(*i),
            // -0.0 and 0.0 compare equal, so they share the 0.0 key; a cache
            // snapshot therefore reports 0.0 for a call made with -0.0
            Value::Float(x) if *x == 0.0 => Key::Float(0f64.to_bits()),
            Value::Float(x) => Key::Float(x.to_bits()),
            Value::Str(s) => Key::Str(s.clone()),
            Value::Tuple(items) => Key::Tuple(
                items
                    .iter()
                    .map(Value::to_key)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Value::List(_) => return None,
        })
    }

    /// First element (depth-first) that prevents hashing, if any.
    pub(crate) fn unhashable_part(&self) -> Option<&Value> {
        match self {
            Value::List(_) => Some(self),
            Value::Tuple(items) => items.iter().find_map(Value::unhashable_part),
            _ => None,
        }
    }
}

fn mismatch(expected: &'static str, got: &Value) -> TransformError {
    TransformError::TypeMismatch {
        expected,
        got: got.kind(),
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // keep the `.0` so whole floats read differently from ints
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => f.write_str(s),
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
        }
    }
}

/// Comma-and-space joined display form of an argument tuple.
pub fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

/// Hashable projection of a [`Value`].
///
/// Floats are keyed by their bit pattern, so `1` and `1.0` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Nil,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Tuple(Vec<Key>),
}

impl Key {
    /// Rebuild the value this key was lowered from.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Nil => Value::Nil,
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(i) => Value::Int(*i),
            Key::Float(bits) => Value::Float(f64::from_bits(*bits)),
            Key::Str(s) => Value::Str(s.clone()),
            Key::Tuple(items) => Value::Tuple(items.iter().map(Key::to_value).collect()),
        }
    }
}
