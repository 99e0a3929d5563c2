//! Core types for logchain-core.
//!
//! This module defines the fundamental data structures shared across every
//! logger and sink: the severity [`Level`], the opaque logged [`Value`], and
//! the captured [`Record`].

use std::fmt;
use std::str::FromStr;

/// Log severity level.
///
/// Levels are tags, not ranks: filters compare them for equality only. The
/// identity of a level is its variant; [`Level::tag`] and [`Level::label`] are
/// display forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    All,
}

impl Level {
    /// Every level, most severe first.
    pub const ALL_LEVELS: [Level; 7] = [
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
        Level::All,
    ];

    /// Fixed-width bracketed tag, seven bytes for every level.
    pub fn tag(self) -> &'static str {
        match self {
            Level::Fatal => "[FATAL]",
            Level::Error => "[ERROR]",
            Level::Warn => "[WARN] ",
            Level::Info => "[INFO] ",
            Level::Debug => "[DEBUG]",
            Level::Trace => "[TRACE]",
            Level::All => "[ALL]  ",
        }
    }

    /// Bracketed tag without padding.
    pub fn label(self) -> &'static str {
        self.tag().trim_end()
    }

    /// Bare upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::All => "ALL",
        }
    }

    /// Levels routed to the error stream by the console sink.
    pub fn is_error(self) -> bool {
        matches!(self, Level::Fatal | Level::Error)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts `info`, `INFO`, `[INFO]` and the padded `[INFO] `.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.trim().trim_start_matches('[').trim_end_matches(']').trim();
        Level::ALL_LEVELS
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(bare))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl<'de> serde::Deserialize<'de> for Level {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// An opaque logged value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Value {
    /// Render a slice the way list values print: `[a b c]`.
    pub fn list(values: &[Value]) -> String {
        let inner: Vec<String> = values.iter().map(ToString::to_string).collect();
        format!("[{}]", inner.join(" "))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("<nil>"),
        }
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

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::UInt(u64::from(n))
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::UInt(n as u64)
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```
/// use logchain_core::{values, Value};
/// let v = values!["answer", 42, true];
/// assert_eq!(v[1], Value::Int(42));
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// One captured logger call.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(level: Level, values: Vec<Value>) -> Self {
        Self { level, values }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
