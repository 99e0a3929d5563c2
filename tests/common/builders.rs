//! Test builders - registries, contexts, and failing sinks.
//!
//! These are designed for readability in test bodies, not for production
//! use. They panic on invalid input rather than returning `Result`.

use logchain::{DirLogger, LineFormat, LogError, Logger};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A fresh registry rooted at `<tempdir>/logs`, with `" | "` / `"\n"` lines.
///
/// Keep the returned `TempDir` alive for as long as the registry is used.
pub fn topic_registry() -> (tempfile::TempDir, Arc<DirLogger>) {
    topic_registry_with(LineFormat::new(" | ", "\n"))
}

pub fn topic_registry_with(format: LineFormat) -> (tempfile::TempDir, Arc<DirLogger>) {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = DirLogger::new(root.path().join("logs"), format).expect("create registry");
    (root, Arc::new(dir))
}

/// A path for a file that does not exist yet inside `root`.
pub fn fresh_file(root: &tempfile::TempDir, name: &str) -> PathBuf {
    root.path().join(name)
}

/// A sink that fails every call and counts how often it was reached.
pub fn failing_sink() -> (Logger, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let logger = Logger::from_fn(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
        Err(LogError::custom("sink refused the call"))
    });
    (logger, calls)
}

/// A sink that panics on every call.
pub fn panicking_sink() -> Logger {
    Logger::from_fn(|_, _| panic!("sink panicked"))
}
