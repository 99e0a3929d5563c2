//! In-memory sink - records every call, in order, for inspection.

use crate::error::LogError;
use crate::logger::{Logger, Sink};
use crate::types::{Level, Record, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, ordered buffer of [`Record`]s filled by an in-memory logger.
///
/// Cloning the buffer shares it. The buffer carries its own lock, so the
/// logger may be called from several threads without extra serialization.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    records: Arc<Mutex<Vec<Record>>>,
}

impl LogBuffer {
    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, record: Record) {
        self.lock().push(record);
    }

    /// Snapshot of every record so far.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// One line per record: level label, then each value, all separated by
    /// `delimiter`, newline terminated.
    pub fn stringify(&self, delimiter: &str) -> String {
        self.stringify_with(ToString::to_string, delimiter, "\n")
    }

    pub fn stringify_with<F>(&self, value_format: F, value_delimiter: &str, call_delimiter: &str) -> String
    where
        F: Fn(&Value) -> String,
    {
        let mut out = String::new();
        for record in self.lock().iter() {
            out.push_str(record.level.label());
            for value in &record.values {
                out.push_str(value_delimiter);
                out.push_str(&value_format(value));
            }
            out.push_str(call_delimiter);
        }
        out
    }
}

struct InMemorySink {
    buffer: LogBuffer,
}

impl Sink for InMemorySink {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        self.buffer.push(Record::new(level, values));
        Ok(())
    }
}

/// A logger bound to a fresh buffer, plus a handle to that buffer.
pub fn new_in_memory_logger() -> (Logger, LogBuffer) {
    let buffer = LogBuffer::default();
    let logger = Logger::from_sink(InMemorySink {
        buffer: buffer.clone(),
    });
    (logger, buffer)
}
