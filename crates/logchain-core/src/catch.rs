//! Panic barrier - turns an unwinding panic into a [`LogError`].
//!
//! Only the boundaries that promise not to propagate failures use these:
//! [`Logger::no_panic`](crate::Logger::no_panic), async dispatch, and the
//! input stream's `no_panic`.

use crate::error::LogError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run `f`, converting a panic into [`LogError::Panicked`].
pub fn catch_error<R>(f: impl FnOnce() -> R) -> Result<R, LogError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        LogError::Panicked(panic_message(payload.as_ref()))
    })
}

/// Run `f` and swallow any panic it raises.
pub fn catch_any(f: impl FnOnce()) {
    let _ = panic::catch_unwind(AssertUnwindSafe(f));
}

/// Best-effort message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
