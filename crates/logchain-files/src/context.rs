//! File-backed logger - one append-only file, one line per call.
//!
//! A [`FileWritingContext`] starts closed. [`FileWritingContext::init`] opens
//! the file and returns a logger bound to it; [`FileWritingContext::close`]
//! flushes and releases the handle. Clones share the same open file, so a
//! registry can hand out handles while keeping one file per path.
//!
//! The writer owns the file, so "handle present" and "writer present" cannot
//! disagree: both live in one `Option`.

use crate::error::FileError;
use crate::format::LineFormat;
use logchain_core::{Level, LogError, Logger, Sink, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Slot = Arc<Mutex<Option<BufWriter<File>>>>;

#[derive(Clone)]
pub struct FileWritingContext {
    path: PathBuf,
    format: LineFormat,
    slot: Slot,
}

impl FileWritingContext {
    /// A closed context for `path`.
    pub fn new(path: impl Into<PathBuf>, format: LineFormat) -> Self {
        Self {
            path: path.into(),
            format,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &LineFormat {
        &self.format
    }

    /// Whether both handles share the same underlying file slot.
    pub fn shares_file_with(&self, other: &FileWritingContext) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub fn is_open(&self) -> bool {
        lock(&self.slot).is_some()
    }

    pub fn format_line(&self, level: Level, values: &[Value]) -> String {
        self.format.format_line(level, values)
    }

    /// Open the file (create, append, write-only) and bind a logger to it.
    pub fn init(&self) -> Result<Logger, FileError> {
        let mut slot = lock(&self.slot);
        if slot.is_some() {
            return Err(FileError::AlreadyOpen {
                path: self.path.clone(),
            });
        }
        let file = open_append(&self.path).map_err(|source| FileError::Open {
            path: self.path.clone(),
            source,
        })?;
        *slot = Some(BufWriter::new(file));
        tracing::debug!(path = %self.path.display(), "opened log file");
        Ok(self.logger())
    }

    /// The logger bound to this context. Calls made while the context is
    /// closed fail with [`LogError::Closed`].
    pub fn logger(&self) -> Logger {
        Logger::from_sink(FileSink {
            path: self.path.clone(),
            format: self.format.clone(),
            slot: Arc::clone(&self.slot),
        })
    }

    /// Flush and release the file. Closing a closed context is an error.
    ///
    /// The handle is released even when the final flush fails.
    pub fn close(&self) -> Result<(), FileError> {
        let writer = lock(&self.slot).take().ok_or_else(|| FileError::AlreadyClosed {
            path: self.path.clone(),
        })?;
        tracing::debug!(path = %self.path.display(), "closing log file");
        writer.into_inner().map(drop).map_err(|err| FileError::Flush {
            path: self.path.clone(),
            source: err.into_error(),
        })
    }
}

impl std::fmt::Debug for FileWritingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWritingContext")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("open", &self.is_open())
            .finish()
    }
}

struct FileSink {
    path: PathBuf,
    format: LineFormat,
    slot: Slot,
}

impl Sink for FileSink {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        let line = self.format.format_line(level, &values);
        // Held across write and flush: concurrent writers never interleave.
        let mut slot = lock(&self.slot);
        let writer = slot.as_mut().ok_or_else(|| LogError::Closed {
            path: self.path.clone(),
        })?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| LogError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<BufWriter<File>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use logchain_core::values;
    use pretty_assertions::assert_eq;

    fn context_in(dir: &tempfile::TempDir) -> FileWritingContext {
        FileWritingContext::new(
            dir.path().join("testfile"),
            LineFormat::new(" | ", "\r\n").with_formatter(|v| v.to_string()),
        )
    }

    #[test]
    fn writes_one_line_per_call_and_rejects_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        assert!(!ctx.is_open());

        let logger = ctx.init().unwrap();
        assert!(ctx.is_open());
        logger.info(["world", "1"]);
        logger.prepend(["hello"]).warn(["world", "2"]);
        assert!(logger.no_panic(Level::Debug, ["world", "3"]).is_ok());

        ctx.close().unwrap();
        assert!(matches!(ctx.close(), Err(FileError::AlreadyClosed { .. })));
        assert!(matches!(
            logger.no_panic(Level::Info, ["world", "4"]),
            Err(LogError::Closed { .. })
        ));

        let text = std::fs::read_to_string(ctx.path()).unwrap();
        assert_eq!(
            text,
            "[INFO] | world | 1\r\n[WARN] | hello | world | 2\r\n[DEBUG] | world | 3\r\n"
        );
    }

    #[test]
    #[should_panic(expected = "is closed")]
    fn direct_call_after_close_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        let logger = ctx.init().unwrap();
        ctx.close().unwrap();
        logger.info(["lost?"]);
    }

    #[test]
    fn closing_a_never_opened_context_is_an_error() {
        let ctx = FileWritingContext::new("unexisting", LineFormat::default());
        assert!(matches!(ctx.close(), Err(FileError::AlreadyClosed { .. })));
        assert!(matches!(
            ctx.logger().no_panic(Level::Info, ["x"]),
            Err(LogError::Closed { .. })
        ));
    }

    #[test]
    fn init_twice_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        ctx.init().unwrap();
        assert!(matches!(ctx.init(), Err(FileError::AlreadyOpen { .. })));
        ctx.close().unwrap();
    }

    #[test]
    fn reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        ctx.init().unwrap().info(["first"]);
        ctx.close().unwrap();
        ctx.init().unwrap().info(["second"]);
        ctx.close().unwrap();

        let text = std::fs::read_to_string(ctx.path()).unwrap();
        assert_eq!(text, "[INFO] | first\r\n[INFO] | second\r\n");
    }

    #[test]
    fn open_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FileWritingContext::new(dir.path().join("missing/sub/file"), LineFormat::default());
        assert!(matches!(ctx.init(), Err(FileError::Open { .. })));
        assert!(!ctx.is_open());
    }

    #[test]
    fn concurrent_writers_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        let logger = ctx.init().unwrap();

        std::thread::scope(|scope| {
            for t in 0..8 {
                let logger = logger.clone();
                scope.spawn(move || {
                    for i in 0..200 {
                        logger.info(values![format!("t{t}"), i, "x".repeat(64)]);
                    }
                });
            }
        });
        ctx.close().unwrap();

        let text = std::fs::read_to_string(ctx.path()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 1600);
        for line in lines {
            let parts: Vec<&str> = line.split(" | ").collect();
            assert_eq!(parts.len(), 4, "torn line: {line:?}");
            assert_eq!(parts[0], "[INFO]");
            assert_eq!(parts[3].len(), 64);
        }
    }

    #[cfg(unix)]
    #[test]
    fn created_with_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(&dir);
        ctx.init().unwrap();
        let mode = std::fs::metadata(ctx.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        ctx.close().unwrap();
    }
}
