//! logchain-files - file sinks for logchain.
//!
//! - [`FileWritingContext`]: one append-only file behind a logger.
//! - [`DirLogger`]: a registry mapping topics to files inside one directory.
//! - [`InputStream`]: a line reader for replaying what was written.
//!
//! Every write flushes before the context lock is released, so a reader
//! opened alongside a writer only ever sees whole lines.

pub mod context;
pub mod dir;
pub mod error;
pub mod format;
pub mod input;

pub use context::FileWritingContext;
pub use dir::DirLogger;
pub use error::FileError;
pub use format::{LineFormat, ValueFormatter};
pub use input::{read_lines, InputStream, SharedInputStream};
