//! logchain - composable loggers.
//!
//! This crate re-exports the two library layers so that integration tests and
//! the `logchain` binary can import them from one place.
//!
//! # Architecture
//!
//! ```text
//! caller ──► decorators ──► sink
//!                            ├── in-memory / console   (logchain-core)
//!                            └── topic files ──► InputStream (logchain-files)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use logchain::{DirLogger, Level, LineFormat};
//!
//! let dir = DirLogger::new("logs", LineFormat::default())?;
//! let logger = dir.get("payments")?.prepend_time().filter([Level::Trace]);
//! logger.info(["charged", "42"]);
//! for err in dir.close_all() {
//!     eprintln!("{err}");
//! }
//! # Ok::<(), logchain::FileError>(())
//! ```

pub use logchain_core::{
    call_context, catch, config, console, decorators, memory, new_in_memory_logger, values,
    ConsoleLogger, ErrorHandler, Level, LogBuffer, LogError, Logger, Record, Sink, Value,
};
pub use logchain_files::{
    read_lines, DirLogger, FileError, FileWritingContext, InputStream, LineFormat,
    SharedInputStream,
};
