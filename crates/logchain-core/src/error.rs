//! Error types surfaced by loggers and sinks.

use std::path::PathBuf;

/// Failure of a single logger call.
///
/// Sinks return it from [`Sink::emit`](crate::Sink::emit). A direct
/// [`Logger::log`](crate::Logger::log) turns it into a panic;
/// [`Logger::no_panic`](crate::Logger::no_panic) hands it back.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("call through an unset logger")]
    Unset,

    #[error("log file {} is closed", path.display())]
    Closed { path: PathBuf },

    #[error("failed writing to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing to {stream}: {source}")]
    Stream {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("panicked: {0}")]
    Panicked(String),

    #[error("no tokio runtime available for async dispatch")]
    NoRuntime,

    #[error("routing to topic {topic:?} failed: {message}")]
    Route { topic: String, message: String },

    #[error("{0}")]
    Custom(String),
}

impl LogError {
    pub fn custom(message: impl Into<String>) -> Self {
        LogError::Custom(message.into())
    }
}
