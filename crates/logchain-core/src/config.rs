//! Configuration types for logchain.
//!
//! [`Config::load`] layers an optional TOML file and `LOGCHAIN__*`
//! environment variables on top of the built-in defaults.
//! [`Config::defaults`] returns the defaults without touching the filesystem
//! (useful in tests).

use crate::decorators::RFC1123;
use crate::logger::Logger;
use crate::types::Level;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[format]
value_delimiter = " | "
call_delimiter  = "\n"
padded_tags     = false
time_format     = "%a, %d %b %Y %H:%M:%S %Z"

[filter]
levels = []

[dir]
path = "logs"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub dir: DirConfig,
}

/// `[format]` section: how file lines are laid out.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_value_delimiter")]
    pub value_delimiter: String,
    #[serde(default = "default_call_delimiter")]
    pub call_delimiter: String,
    #[serde(default)]
    pub padded_tags: bool,
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

fn default_value_delimiter() -> String { " | ".to_string() }
fn default_call_delimiter() -> String { "\n".to_string() }
fn default_time_format() -> String { RFC1123.to_string() }

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            value_delimiter: default_value_delimiter(),
            call_delimiter: default_call_delimiter(),
            padded_tags: false,
            time_format: default_time_format(),
        }
    }
}

/// `[filter]` section: levels dropped before reaching any sink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub levels: Vec<Level>,
}

/// `[dir]` section: base directory of topic files.
#[derive(Debug, Clone, Deserialize)]
pub struct DirConfig {
    #[serde(default = "default_dir_path")]
    pub path: PathBuf,
}

fn default_dir_path() -> PathBuf { PathBuf::from("logs") }

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            path: default_dir_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the defaults, then `path` if given (it must exist), then the
    /// environment (`LOGCHAIN__FORMAT__VALUE_DELIMITER=...`).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        tracing::debug!(path = ?path, "loading logchain config");
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder
            .add_source(config::Environment::with_prefix("LOGCHAIN").prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Wrap `logger` with the configured level filter, if any.
    pub fn apply_filter(&self, logger: &Logger) -> Logger {
        if self.filter.levels.is_empty() {
            logger.clone()
        } else {
            logger.filter(self.filter.levels.iter().copied())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::new_in_memory_logger;
    use std::io::Write;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.format.value_delimiter, " | ");
        assert_eq!(cfg.format.call_delimiter, "\n");
        assert!(!cfg.format.padded_tags);
        assert_eq!(cfg.format.time_format, RFC1123);
        assert!(cfg.filter.levels.is_empty());
        assert_eq!(cfg.dir.path, PathBuf::from("logs"));
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[format]\nvalue_delimiter = \" , \"\n\n[filter]\nlevels = [\"debug\", \"[TRACE]\"]"
        )
        .unwrap();

        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.format.value_delimiter, " , ");
        assert_eq!(cfg.format.call_delimiter, "\n");
        assert_eq!(cfg.filter.levels, vec![Level::Debug, Level::Trace]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/logchain.toml"))).is_err());
    }

    #[test]
    fn apply_filter_drops_configured_levels() {
        let mut cfg = Config::defaults();
        cfg.filter.levels = vec![Level::Debug];
        let (sink, buffer) = new_in_memory_logger();
        let logger = cfg.apply_filter(&sink);
        logger.debug(["hidden"]);
        logger.info(["shown"]);
        assert_eq!(buffer.len(), 1);
    }
}
