//! Console appender implementation

use crate::core::{Appender, LogEntry, Result};
use colored::Colorize;

/// Default timestamp layout, RFC 3339 with milliseconds
const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub struct ConsoleAppender {
    use_colors: bool,
    json: bool,
    show_location: bool,
    timestamp_format: String,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            json: false,
            show_location: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    /// Emit one JSON object per entry instead of text
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Append `(file:line)` of the binding site to text output
    #[must_use]
    pub fn with_location(mut self, show: bool) -> Self {
        self.show_location = show;
        self
    }

    /// Set a strftime-compatible timestamp format
    ///
    /// # Examples
    ///
    /// ```
    /// use tls_log_adapter::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_timestamp_format("%d/%b/%Y:%H:%M:%S %z");
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format_str: &str) -> Self {
        self.timestamp_format = format_str.to_string();
        self
    }

    /// Format as text with optional colors
    fn format_text(&self, entry: &LogEntry) -> String {
        let kind_str = if self.use_colors {
            format!("{:5}", entry.kind.to_str())
                .color(entry.kind.color_code())
                .to_string()
        } else {
            format!("{:5}", entry.kind.to_str())
        };

        let mut output = format!(
            "[{}] [{}] {} -",
            entry.timestamp.format(&self.timestamp_format),
            kind_str,
            entry.thread_name.as_ref().unwrap_or(&entry.thread_id),
        );

        if let Some(ref request) = entry.request {
            output.push_str(" (");
            output.push_str(request);
            output.push(')');
        }

        output.push(' ');
        output.push_str(&entry.message);

        if self.show_location {
            if let Some(location) = entry.location() {
                output.push_str(" [");
                output.push_str(&location);
                output.push(']');
            }
        }

        // Append context fields if present
        if let Some(ref context) = entry.context {
            if !context.is_empty() {
                output.push(' ');
                output.push_str(&context.format_fields());
            }
        }

        output
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = if self.json {
            serde_json::to_string(entry)?
        } else {
            self.format_text(entry)
        };

        // Error kinds go to stderr, everything else to stdout
        if entry.kind.is_error() {
            eprintln!("{}", output);
        } else {
            println!("{}", output);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
