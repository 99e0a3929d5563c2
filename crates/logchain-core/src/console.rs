//! Console sink - `FATAL`/`ERROR` to stderr, everything else to stdout.

use crate::error::LogError;
use crate::logger::{Logger, Sink};
use crate::types::{Level, Value};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

type Stream = Mutex<Box<dyn Write + Send>>;

/// Writes `"{tag} : [v1 v2 ...]\r\n"` per call.
pub struct ConsoleLogger {
    out: Stream,
    err: Stream,
}

impl ConsoleLogger {
    pub fn stdio() -> Logger {
        Self::with_writers(io::stdout(), io::stderr())
    }

    pub fn with_writers(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Logger {
        Logger::from_sink(ConsoleLogger {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
        })
    }
}

impl Sink for ConsoleLogger {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        let (stream, name) = if level.is_error() {
            (&self.err, "stderr")
        } else {
            (&self.out, "stdout")
        };
        let line = format!("{} : {}\r\n", level.tag(), Value::list(&values));
        let mut writer = stream.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|source| LogError::Stream { stream: name, source })
    }
}
