//! Line reader - replays a log file one line at a time.
//!
//! An [`InputStream`] closes its file the first time it hits end of input and
//! yields `None` from then on, even if the file grows later. Pulling from an
//! unset stream or hitting a read error fails fast; [`InputStream::no_panic`]
//! turns both into errors.

use crate::error::FileError;
use logchain_core::catch::catch_error;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

enum State {
    Open { path: PathBuf, reader: BufReader<File> },
    Exhausted,
    Unset,
}

pub struct InputStream {
    state: State,
}

impl InputStream {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| FileError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            state: State::Open {
                path,
                reader: BufReader::new(file),
            },
        })
    }

    /// A stream with no file behind it; every pull fails.
    pub fn unset() -> Self {
        Self { state: State::Unset }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    /// Next line without its terminator (`\n` or `\r\n`). Invalid UTF-8 is
    /// replaced with U+FFFD rather than failing the line.
    pub fn next_line(&mut self) -> Result<Option<String>, FileError> {
        let (path, reader) = match &mut self.state {
            State::Open { path, reader } => (path, reader),
            State::Exhausted => return Ok(None),
            State::Unset => return Err(FileError::UnsetStream),
        };
        let mut raw = Vec::new();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                tracing::trace!(path = %path.display(), "input exhausted");
                // Dropping the reader closes the file.
                self.state = State::Exhausted;
                Ok(None)
            }
            Ok(_) => {
                if raw.last() == Some(&b'\n') {
                    raw.pop();
                    if raw.last() == Some(&b'\r') {
                        raw.pop();
                    }
                }
                Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
            }
            Err(source) => Err(FileError::Read {
                path: path.clone(),
                source,
            }),
        }
    }

    /// Next line, or `None` once exhausted. Fails fast on an unset stream or
    /// a read error.
    pub fn pull(&mut self) -> Option<String> {
        match self.next_line() {
            Ok(line) => line,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`InputStream::pull`], with failures (panics included) returned.
    pub fn no_panic(&mut self) -> Result<Option<String>, FileError> {
        catch_error(|| self.pull()).map_err(FileError::from)
    }

    /// Share the stream between threads; every pull takes the lock.
    pub fn with_lock(self) -> SharedInputStream {
        SharedInputStream {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

impl Default for InputStream {
    fn default() -> Self {
        Self::unset()
    }
}

impl Iterator for InputStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.pull()
    }
}

/// A lock-guarded [`InputStream`]; clones pull from the same cursor.
#[derive(Clone)]
pub struct SharedInputStream {
    inner: Arc<Mutex<InputStream>>,
}

impl SharedInputStream {
    pub fn pull(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pull()
    }

    pub fn no_panic(&self) -> Result<Option<String>, FileError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .no_panic()
    }
}

/// Every line of `path`, in order.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, FileError> {
    let mut input = InputStream::open(path)?;
    let mut lines = Vec::new();
    while let Some(line) = input.next_line()? {
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn yields_lines_then_none_forever() {
        let file = file_with("one\r\ntwo\nthree");
        let mut input = InputStream::open(file.path()).unwrap();
        assert_eq!(input.pull().as_deref(), Some("one"));
        assert_eq!(input.pull().as_deref(), Some("two"));
        assert_eq!(input.pull().as_deref(), Some("three"));
        assert_eq!(input.pull(), None);
        assert!(input.is_exhausted());
        assert_eq!(input.pull(), None);
        assert!(matches!(input.no_panic(), Ok(None)));
    }

    #[test]
    fn exhausted_stream_ignores_later_appends() {
        let mut file = file_with("a\n");
        let mut input = InputStream::open(file.path()).unwrap();
        assert_eq!(input.by_ref().collect::<Vec<_>>(), vec!["a".to_string()]);
        file.write_all(b"b\n").unwrap();
        assert_eq!(input.pull(), None);
    }

    #[test]
    fn missing_file_fails_to_open() {
        assert!(matches!(
            InputStream::open("/nonexistent/logchain/input"),
            Err(FileError::Open { .. })
        ));
    }

    #[test]
    fn unset_stream_reports_through_no_panic() {
        let mut input = InputStream::unset();
        assert!(input.no_panic().is_err());
        assert!(matches!(input.next_line(), Err(FileError::UnsetStream)));
    }

    #[test]
    #[should_panic(expected = "unset input stream")]
    fn unset_stream_fails_fast() {
        InputStream::default().pull();
    }

    #[test]
    fn shared_stream_hands_each_line_out_once() {
        let content: String = (0..500).map(|i| format!("line {i}\n")).collect();
        let file = file_with(&content);
        let shared = InputStream::open(file.path()).unwrap().with_lock();

        let mut seen: Vec<String> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let shared = shared.clone();
                    scope.spawn(move || {
                        let mut mine = Vec::new();
                        while let Some(line) = shared.pull() {
                            mine.push(line);
                        }
                        mine
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });

        seen.sort_by_key(|l| l[5..].parse::<u32>().unwrap());
        let expected: Vec<String> = (0..500).map(|i| format!("line {i}")).collect();
        assert_eq!(seen, expected);
        assert!(matches!(shared.no_panic(), Ok(None)));
    }

    #[test]
    fn invalid_utf8_lines_are_kept_lossily() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ok\nbad \xff byte\r\nlast\n").unwrap();

        let mut input = InputStream::open(file.path()).unwrap();
        assert!(matches!(input.no_panic(), Ok(Some(ref l)) if l == "ok"));
        assert!(matches!(input.no_panic(), Ok(Some(ref l)) if l == "bad \u{FFFD} byte"));
        assert!(matches!(input.no_panic(), Ok(Some(ref l)) if l == "last"));
        assert!(matches!(input.no_panic(), Ok(None)));

        assert_eq!(
            read_lines(file.path()).unwrap(),
            vec!["ok", "bad \u{FFFD} byte", "last"]
        );
    }

    #[test]
    fn read_lines_collects_everything() {
        let file = file_with("x\ny\n");
        assert_eq!(read_lines(file.path()).unwrap(), vec!["x", "y"]);
    }
}
