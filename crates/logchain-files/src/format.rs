//! Line layout shared by every file a registry opens.

use logchain_core::config::FormatConfig;
use logchain_core::{Level, Value};
use std::fmt;
use std::sync::Arc;

/// Custom stringification applied to each value before it is written.
pub type ValueFormatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// `label<vd>v1<vd>v2...<cd>`
///
/// Delimiters occurring inside a value are written as-is; a reader cannot
/// tell them apart from real separators.
#[derive(Clone)]
pub struct LineFormat {
    pub value_delimiter: String,
    pub call_delimiter: String,
    /// Write the fixed-width tag (`[INFO] `) instead of the label (`[INFO]`).
    pub padded_tags: bool,
    formatter: Option<ValueFormatter>,
}

impl LineFormat {
    pub fn new(value_delimiter: impl Into<String>, call_delimiter: impl Into<String>) -> Self {
        Self {
            value_delimiter: value_delimiter.into(),
            call_delimiter: call_delimiter.into(),
            padded_tags: false,
            formatter: None,
        }
    }

    pub fn from_config(config: &FormatConfig) -> Self {
        Self::new(&config.value_delimiter, &config.call_delimiter).with_padded_tags(config.padded_tags)
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn with_padded_tags(mut self, padded: bool) -> Self {
        self.padded_tags = padded;
        self
    }

    pub fn format_line(&self, level: Level, values: &[Value]) -> String {
        let mut line = String::from(if self.padded_tags { level.tag() } else { level.label() });
        for value in values {
            line.push_str(&self.value_delimiter);
            match &self.formatter {
                Some(format) => line.push_str(&format(value)),
                None => line.push_str(&value.to_string()),
            }
        }
        line.push_str(&self.call_delimiter);
        line
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::new(" | ", "\n")
    }
}

impl fmt::Debug for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineFormat")
            .field("value_delimiter", &self.value_delimiter)
            .field("call_delimiter", &self.call_delimiter)
            .field("padded_tags", &self.padded_tags)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}
