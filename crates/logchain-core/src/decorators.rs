//! Logger decorators.
//!
//! Each decorator is a [`Sink`] that owns the [`Logger`] it wraps plus its own
//! parameters, and each has a chaining constructor on [`Logger`]. A decorator
//! applied later runs first, so for
//!
//! ```text
//! sink.prepend(["p1"]).prepend(["p2"]).append(["a1"]).append(["a2"])
//! ```
//!
//! a call with `["msg"]` reaches `sink` as `["p1", "p2", "msg", "a2", "a1"]`:
//! values added closer to the sink end up further from the payload.

use crate::catch::{catch_any, catch_error};
use crate::error::LogError;
use crate::logger::{collect, Logger, Sink};
use crate::types::{Level, Value};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};

/// Default timestamp layout (RFC 1123).
pub const RFC1123: &str = "%a, %d %b %Y %H:%M:%S %Z";

/// Callback receiving failures of asynchronously dispatched calls.
pub type ErrorHandler = Arc<dyn Fn(LogError) + Send + Sync>;

// ---------------------------------------------------------------------------
// Prepend / Append
// ---------------------------------------------------------------------------

pub struct Prepend {
    inner: Logger,
    values: Vec<Value>,
}

impl Sink for Prepend {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        let mut all = Vec::with_capacity(self.values.len() + values.len());
        all.extend(self.values.iter().cloned());
        all.extend(values);
        self.inner.try_emit(level, all)
    }
}

pub struct Append {
    inner: Logger,
    values: Vec<Value>,
}

impl Sink for Append {
    fn emit(&self, level: Level, mut values: Vec<Value>) -> Result<(), LogError> {
        values.extend(self.values.iter().cloned());
        self.inner.try_emit(level, values)
    }
}

// ---------------------------------------------------------------------------
// Time / task count
// ---------------------------------------------------------------------------

pub struct PrependTime {
    inner: Logger,
    format: String,
}

impl Sink for PrependTime {
    fn emit(&self, level: Level, mut values: Vec<Value>) -> Result<(), LogError> {
        let mut stamp = String::new();
        write!(stamp, "{}", chrono::Local::now().format(&self.format))
            .map_err(|_| LogError::custom(format!("invalid time format {:?}", self.format)))?;
        values.insert(0, Value::Str(stamp));
        self.inner.try_emit(level, values)
    }
}

/// Prepends `[ Tasks : N ]`, the alive task count of the current runtime.
pub struct PrependTaskCount {
    inner: Logger,
}

impl Sink for PrependTaskCount {
    fn emit(&self, level: Level, mut values: Vec<Value>) -> Result<(), LogError> {
        let tasks = tokio::runtime::Handle::try_current()
            .map(|handle| handle.metrics().num_alive_tasks())
            .unwrap_or(0);
        values.insert(0, Value::Str(format!("[ Tasks : {tasks} ]")));
        self.inner.try_emit(level, values)
    }
}

// ---------------------------------------------------------------------------
// Call-site annotation
// ---------------------------------------------------------------------------

/// Prepends a ` -> name [args] : ` header.
pub struct CallContext {
    inner: Logger,
    header: Value,
}

impl CallContext {
    pub fn header(&self) -> &Value {
        &self.header
    }
}

impl Sink for CallContext {
    fn emit(&self, level: Level, mut values: Vec<Value>) -> Result<(), LogError> {
        values.insert(0, self.header.clone());
        self.inner.try_emit(level, values)
    }
}

/// Keep only the last namespace segment: `a::b::run` and `pkg.run` give `run`.
pub fn short_name(label: &str) -> &str {
    let last = label.rsplit("::").next().unwrap_or(label);
    last.rsplit('.').next().unwrap_or(last)
}

/// Path of the function enclosing a marker fn, given the marker's type name.
///
/// Used by [`call_context!`](crate::call_context); closure frames are skipped.
#[doc(hidden)]
pub fn enclosing_function(marker: &'static str) -> &'static str {
    let mut name = marker.strip_suffix("::__here").unwrap_or(marker);
    while let Some(outer) = name.strip_suffix("::{{closure}}") {
        name = outer;
    }
    name
}

/// Annotate a logger with the enclosing function's name and the given args.
///
/// ```
/// use logchain_core::{call_context, Logger};
///
/// fn is_factor(n: u32, f: u32, logger: &Logger) -> bool {
///     let logger = call_context!(logger, n, f);
///     let yes = n % f == 0;
///     logger.trace([yes]);
///     yes
/// }
/// # is_factor(9, 3, &Logger::noop());
/// ```
#[macro_export]
macro_rules! call_context {
    ($logger:expr $(, $arg:expr)* $(,)?) => {{
        fn __here() {}
        let name = $crate::decorators::enclosing_function(::std::any::type_name_of_val(&__here));
        $logger.with_call_context(name, $crate::values![$($arg),*])
    }};
}

// ---------------------------------------------------------------------------
// Filter / lock
// ---------------------------------------------------------------------------

/// Drops calls whose level equals one of `levels`.
pub struct Filter {
    inner: Logger,
    levels: Vec<Level>,
}

impl Sink for Filter {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        if self.levels.contains(&level) {
            return Ok(());
        }
        self.inner.try_emit(level, values)
    }
}

/// Serializes every call through one mutex.
pub struct Locked {
    inner: Logger,
    lock: Mutex<()>,
}

impl Sink for Locked {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        // A panicking call poisons the mutex; the unit it guards cannot be torn.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.try_emit(level, values)
    }
}

// ---------------------------------------------------------------------------
// Async dispatch
// ---------------------------------------------------------------------------

/// Runs every call on the blocking pool of a tokio runtime.
///
/// The caller never waits and never sees the outcome. Failures, returned or
/// panicked, go to the handler; a panic inside the handler is swallowed. A
/// call the runtime drops without running (it has shut down) is reported as
/// [`LogError::NoRuntime`].
pub struct AsyncDispatch {
    inner: Logger,
    handle: tokio::runtime::Handle,
    handler: Option<ErrorHandler>,
}

impl Sink for AsyncDispatch {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        let pending = PendingCall {
            call: Some((self.inner.clone(), level, values)),
            handler: self.handler.clone(),
        };
        self.handle.spawn_blocking(move || pending.run());
        Ok(())
    }
}

/// One dispatched call. Dropping it unrun reports [`LogError::NoRuntime`].
struct PendingCall {
    call: Option<(Logger, Level, Vec<Value>)>,
    handler: Option<ErrorHandler>,
}

impl PendingCall {
    fn run(mut self) {
        if let Some((inner, level, values)) = self.call.take() {
            let outcome = catch_error(|| inner.try_emit(level, values)).and_then(|r| r);
            if let Err(err) = outcome {
                self.report(err);
            }
        }
    }

    fn report(&self, err: LogError) {
        if let Some(handler) = &self.handler {
            catch_any(|| handler(err));
        }
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if self.call.take().is_some() {
            tracing::debug!("async log call dropped by a stopped runtime");
            self.report(LogError::NoRuntime);
        }
    }
}

// ---------------------------------------------------------------------------
// Chaining constructors
// ---------------------------------------------------------------------------

impl Logger {
    pub fn prepend<I>(&self, values: I) -> Logger
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Logger::from_sink(Prepend {
            inner: self.clone(),
            values: collect(values),
        })
    }

    pub fn append<I>(&self, values: I) -> Logger
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Logger::from_sink(Append {
            inner: self.clone(),
            values: collect(values),
        })
    }

    /// Prepend the local time in RFC 1123 layout.
    pub fn prepend_time(&self) -> Logger {
        self.prepend_time_with(RFC1123)
    }

    /// Prepend the local time in a `chrono` strftime layout.
    pub fn prepend_time_with(&self, format: impl Into<String>) -> Logger {
        Logger::from_sink(PrependTime {
            inner: self.clone(),
            format: format.into(),
        })
    }

    pub fn prepend_task_count(&self) -> Logger {
        Logger::from_sink(PrependTaskCount {
            inner: self.clone(),
        })
    }

    /// Prepend ` -> name [args] : `, `name` being the last segment of `label`.
    ///
    /// Nested annotations accumulate outer to inner. See
    /// [`call_context!`](crate::call_context) to derive `label` automatically.
    pub fn with_call_context<I>(&self, label: &str, args: I) -> Logger
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let header = format!(" -> {} {} : ", short_name(label), Value::list(&collect(args)));
        Logger::from_sink(CallContext {
            inner: self.clone(),
            header: Value::Str(header),
        })
    }

    pub fn filter<I>(&self, levels: I) -> Logger
    where
        I: IntoIterator<Item = Level>,
    {
        Logger::from_sink(Filter {
            inner: self.clone(),
            levels: levels.into_iter().collect(),
        })
    }

    pub fn with_lock(&self) -> Logger {
        Logger::from_sink(Locked {
            inner: self.clone(),
            lock: Mutex::new(()),
        })
    }

    /// Dispatch calls on the current tokio runtime, reporting failures to
    /// `handler`. Fails with [`LogError::NoRuntime`] outside a runtime.
    pub fn dispatch_async<F>(&self, handler: F) -> Result<Logger, LogError>
    where
        F: Fn(LogError) + Send + Sync + 'static,
    {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| LogError::NoRuntime)?;
        Ok(self.dispatch_async_on(handle, Some(Arc::new(handler))))
    }

    /// Dispatch calls on the current tokio runtime, dropping failures.
    pub fn dispatch_async_unhandled(&self) -> Result<Logger, LogError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| LogError::NoRuntime)?;
        Ok(self.dispatch_async_on(handle, None))
    }

    pub fn dispatch_async_on(
        &self,
        handle: tokio::runtime::Handle,
        handler: Option<ErrorHandler>,
    ) -> Logger {
        Logger::from_sink(AsyncDispatch {
            inner: self.clone(),
            handle,
            handler,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
