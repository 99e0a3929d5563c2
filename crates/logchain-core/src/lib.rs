//! logchain-core - composable loggers.
//!
//! A [`Logger`] accepts a [`Level`] and a sequence of [`Value`]s. Decorators
//! wrap one logger into another; sinks at the bottom of the chain perform the
//! write.
//!
//! # Architecture
//!
//! ```text
//! caller ──► decorators (outermost first) ──► sink
//!                                              ├── in-memory buffer
//!                                              ├── console
//!                                              └── files (logchain-files)
//! ```
//!
//! Sink failures travel back up the chain as [`LogError`]s. A direct
//! [`Logger::log`] fails fast on them; [`Logger::no_panic`] and async dispatch
//! are the boundaries that contain them.

pub mod catch;
pub mod config;
pub mod console;
pub mod decorators;
pub mod error;
pub mod logger;
pub mod memory;
pub mod types;

pub use console::ConsoleLogger;
pub use decorators::ErrorHandler;
pub use error::LogError;
pub use logger::{Logger, Sink};
pub use memory::{new_in_memory_logger, LogBuffer};
pub use types::{Level, ParseLevelError, Record, Value};
