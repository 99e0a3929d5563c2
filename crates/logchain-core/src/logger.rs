//! The [`Sink`] trait and the [`Logger`] handle.
//!
//! A logger is an immutable, cheaply clonable handle around a shared sink.
//! Decorators (see [`crate::decorators`]) wrap one logger in a new sink and
//! hand back a new logger; the wrapped logger is never touched.
//!
//! ```text
//! caller ──► filter ──► prepend ──► lock ──► file sink
//!            (outermost, applied last)        (innermost)
//! ```

use crate::catch::catch_error;
use crate::error::LogError;
use crate::types::{Level, Value};
use std::fmt;
use std::sync::Arc;

/// Anything that can receive a logger call.
pub trait Sink: Send + Sync {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError>;
}

/// A composable logger.
///
/// A default-constructed logger is *unset*: calling [`Logger::log`] through it
/// panics, and [`Logger::no_panic`] reports [`LogError::Unset`].
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<Arc<dyn Sink>>,
}

impl Logger {
    pub fn from_sink(sink: impl Sink + 'static) -> Self {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    pub fn from_arc(sink: Arc<dyn Sink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Build a logger from a fallible closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Level, Vec<Value>) -> Result<(), LogError> + Send + Sync + 'static,
    {
        Self::from_sink(FnSink(f))
    }

    /// A logger that accepts and discards every call.
    pub fn noop() -> Self {
        Self::from_fn(|_, _| Ok(()))
    }

    pub fn unset() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.sink.is_some()
    }

    /// Forward one call, returning the sink's error instead of panicking.
    ///
    /// A panic raised inside the sink still unwinds; use
    /// [`Logger::no_panic`] to contain it.
    pub fn try_emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        match &self.sink {
            Some(sink) => sink.emit(level, values),
            None => Err(LogError::Unset),
        }
    }

    /// Log one call. Fails fast: a sink error panics at the call site.
    pub fn log<I>(&self, level: Level, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        if let Err(err) = self.try_emit(level, collect(values)) {
            panic!("{err}");
        }
    }

    /// Log one call, turning both sink errors and panics into `Err`.
    pub fn no_panic<I>(&self, level: Level, values: I) -> Result<(), LogError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = collect(values);
        catch_error(|| self.try_emit(level, values))?
    }

    pub fn fatal<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::Fatal, values)
    }

    pub fn error<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::Error, values)
    }

    pub fn warn<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::Warn, values)
    }

    pub fn info<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::Info, values)
    }

    pub fn debug<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::Debug, values)
    }

    pub fn trace<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::Trace, values)
    }

    pub fn all<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.log(Level::All, values)
    }
}

impl Sink for Logger {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        self.try_emit(level, values)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("set", &self.is_set())
            .finish()
    }
}

pub(crate) fn collect<I>(values: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    values.into_iter().map(Into::into).collect()
}

struct FnSink<F>(F);

impl<F> Sink for FnSink<F>
where
    F: Fn(Level, Vec<Value>) -> Result<(), LogError> + Send + Sync,
{
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        (self.0)(level, values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
