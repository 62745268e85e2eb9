//! Log entry structure

use super::log_context::{LogContext, RequestContext};
use super::log_kind::LogKind;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::panic::Location;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<LogContext>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so payload data pulled out of the TLS library cannot forge records.
    fn sanitize_message(message: &str) -> String {
        if !message.contains(['\n', '\r', '\t']) {
            return message.to_string();
        }
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(kind: LogKind, level: LogLevel, message: impl AsRef<str>) -> Self {
        Self::with_message(kind, level, Self::sanitize_message(message.as_ref()))
    }

    /// Create an entry for a line of library trace output.
    ///
    /// The line is kept byte for byte. Tabs and a trailing `\r` from a CRLF
    /// terminated trace are not escaped.
    pub fn trace(kind: LogKind, level: LogLevel, line: impl Into<String>) -> Self {
        Self::with_message(kind, level, line.into())
    }

    fn with_message(kind: LogKind, level: LogLevel, message: String) -> Self {
        Self {
            kind,
            level,
            message,
            timestamp: Utc::now(),
            file: None,
            line: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            request: None,
            context: None,
        }
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self
    }

    /// Attach a caller location captured with `#[track_caller]`
    pub fn with_site(self, site: &Location<'_>) -> Self {
        self.with_location(site.file(), site.line())
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Tag the entry with a request's name and copy its fields
    pub fn with_request(mut self, request: &RequestContext) -> Self {
        self.request = Some(request.name().to_string());
        if !request.fields().is_empty() {
            self.context = Some(request.fields().clone());
        }
        self
    }

    /// `file:line` if a location is attached
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }
}
