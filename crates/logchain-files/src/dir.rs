//! Topic registry - one file per topic inside a directory.
//!
//! [`DirLogger::get`] resolves a topic to `directory/topic`, opening the file
//! on first use and reusing it afterwards. The registry lock is held across
//! the lookup and the open, so racing callers for a new topic still end up
//! sharing one handle.

use crate::context::FileWritingContext;
use crate::error::FileError;
use crate::format::LineFormat;
use logchain_core::{Level, LogError, Logger, Sink, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Entry {
    topic: String,
    context: FileWritingContext,
}

#[derive(Debug)]
pub struct DirLogger {
    dir: PathBuf,
    template: LineFormat,
    open: Mutex<Vec<Entry>>,
}

impl DirLogger {
    /// Create `dir` (it must not exist yet) and an empty registry whose files
    /// all use `template`.
    pub fn new(dir: impl Into<PathBuf>, template: LineFormat) -> Result<Self, FileError> {
        let dir = dir.into();
        std::fs::create_dir(&dir).map_err(|source| FileError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "created topic directory");
        Ok(Self {
            dir,
            template,
            open: Mutex::new(Vec::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn template(&self) -> &LineFormat {
        &self.template
    }

    /// `directory/topic`, verbatim: a topic containing `/` names a nested path.
    pub fn resolve(&self, topic: &str) -> PathBuf {
        let mut path = OsString::from(self.dir.as_os_str());
        path.push("/");
        path.push(topic);
        PathBuf::from(path)
    }

    /// The context for `topic`, opened on first access.
    pub fn context(&self, topic: &str) -> Result<FileWritingContext, FileError> {
        let mut open = self.lock();
        if let Some(entry) = open.iter().find(|entry| entry.topic == topic) {
            return Ok(entry.context.clone());
        }
        let context = FileWritingContext::new(self.resolve(topic), self.template.clone());
        context.init()?;
        tracing::trace!(topic, entries = open.len() + 1, "registered topic");
        open.push(Entry {
            topic: topic.to_string(),
            context: context.clone(),
        });
        Ok(context)
    }

    /// The logger for `topic`, opened on first access.
    pub fn get(&self, topic: &str) -> Result<Logger, FileError> {
        self.context(topic).map(|context| context.logger())
    }

    /// Registered topics, in first-access order.
    pub fn topics(&self) -> Vec<String> {
        self.lock().iter().map(|entry| entry.topic.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Close every registered file and empty the registry.
    ///
    /// Every entry is attempted; the returned list holds one error per entry
    /// that failed to close.
    pub fn close_all(&self) -> Vec<FileError> {
        let mut open = self.lock();
        let count = open.len();
        let errors: Vec<FileError> = open
            .drain(..)
            .filter_map(|entry| entry.context.close().err())
            .collect();
        tracing::debug!(dir = %self.dir.display(), count, failed = errors.len(), "closed topic files");
        errors
    }

    /// A logger that picks a topic per call and forwards to that topic's file.
    pub fn route_by<F>(self: &Arc<Self>, pick: F) -> Logger
    where
        F: Fn(Level, &[Value]) -> String + Send + Sync + 'static,
    {
        Logger::from_sink(TopicRouter {
            dir: Arc::clone(self),
            pick: Box::new(pick),
        })
    }

    /// Route each call to the topic named after its level (`info`, `error`, ...).
    pub fn route_by_level(self: &Arc<Self>) -> Logger {
        self.route_by(|level, _| level.name().to_ascii_lowercase())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

type TopicPicker = Box<dyn Fn(Level, &[Value]) -> String + Send + Sync>;

struct TopicRouter {
    dir: Arc<DirLogger>,
    pick: TopicPicker,
}

impl Sink for TopicRouter {
    fn emit(&self, level: Level, values: Vec<Value>) -> Result<(), LogError> {
        let topic = (self.pick)(level, &values);
        let logger = self.dir.get(&topic).map_err(|err| LogError::Route {
            topic: topic.clone(),
            message: err.to_string(),
        })?;
        logger.try_emit(level, values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
