//! Error type for file-backed loggers, the topic registry, and line readers.

use logchain_core::LogError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("log file {} is already open", path.display())]
    AlreadyOpen { path: PathBuf },

    #[error("trying to close already closed log file {}", path.display())]
    AlreadyClosed { path: PathBuf },

    #[error("failed to flush {}: {source}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("pull from an unset input stream")]
    UnsetStream,

    #[error(transparent)]
    Log(#[from] LogError),
}
