//! Host log facility
//!
//! `Logger` receives the records produced by log BIOs, the error drainer and
//! the certificate chain printer, applies the process or request debug gate,
//! and dispatches what passes to its appenders.

use super::{
    appender::Appender,
    error::Result,
    log_context::RequestContext,
    log_entry::LogEntry,
    log_kind::LogKind,
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct Logger {
    debug_level: RwLock<LogLevel>,
    appenders: RwLock<Vec<Box<dyn Appender>>>,
    /// Metrics for observability (dropped count, total logged, etc.)
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            debug_level: RwLock::new(LogLevel::Off),
            appenders: RwLock::new(Vec::new()),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    /// Write one entry to every appender with per-appender panic isolation
    ///
    /// A failing or panicking appender never prevents the others from
    /// receiving the entry, and never unwinds into the TLS library's callback.
    fn process_sync(
        appenders: &mut [Box<dyn Appender>],
        entry: &LogEntry,
        metrics: &LoggerMetrics,
    ) -> bool {
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(entry)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[TLS LOG ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[TLS LOG CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }

        has_error
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.appenders.write().push(appender);
    }

    /// Set the process-wide debug level
    pub fn set_debug_level(&self, level: LogLevel) {
        *self.debug_level.write() = level;
    }

    pub fn debug_level(&self) -> LogLevel {
        *self.debug_level.read()
    }

    /// Whether a record bound at `level` passes the process debug gate
    #[inline]
    pub fn debug_enabled(&self, level: LogLevel) -> bool {
        self.debug_level().allows(level)
    }

    /// Dispatch an entry without any gating
    pub fn log_entry(&self, entry: LogEntry) {
        let mut appenders = self.appenders.write();
        Self::process_sync(&mut appenders, &entry, &self.metrics);
    }

    /// Dispatch an entry if it passes the process debug gate
    pub fn log_global_entry(&self, entry: LogEntry) -> bool {
        if !self.debug_enabled(entry.level) {
            self.metrics.record_filtered();
            return false;
        }
        self.log_entry(entry);
        true
    }

    /// Dispatch an entry against a request
    ///
    /// Error kinds always pass; other kinds need the request's debug level to
    /// reach the entry's level.
    pub fn log_request_entry(&self, request: &RequestContext, entry: LogEntry) -> bool {
        if !entry.kind.is_error() && !request.debug_enabled(entry.level) {
            self.metrics.record_filtered();
            return false;
        }
        self.log_entry(entry.with_request(request));
        true
    }

    /// Log a message on the global channel regardless of debug level
    pub fn log(&self, kind: LogKind, message: impl AsRef<str>) {
        self.log_entry(LogEntry::new(kind, LogLevel::Off, message));
    }

    pub fn log_global(&self, kind: LogKind, level: LogLevel, message: impl AsRef<str>) -> bool {
        self.log_global_entry(LogEntry::new(kind, level, message))
    }

    pub fn log_request(
        &self,
        request: &RequestContext,
        kind: LogKind,
        level: LogLevel,
        message: impl AsRef<str>,
    ) -> bool {
        self.log_request_entry(request, LogEntry::new(kind, level, message))
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogKind::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogKind::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogKind::Error, message);
    }

    #[inline]
    pub fn debug(&self, level: LogLevel, message: impl AsRef<str>) -> bool {
        self.log_global(LogKind::Debug, level, message)
    }

    /// Get the number of records at least one appender failed to write
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[TLS LOG ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[TLS LOG WARNING] Logger shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use tls_log_adapter::prelude::*;
///
/// let (memory, _records) = MemoryAppender::new();
/// let logger = Logger::builder()
///     .debug_level(LogLevel::Lvl2)
///     .appender(memory)
///     .build();
///
/// assert!(logger.debug_enabled(LogLevel::Lvl2));
/// ```
pub struct LoggerBuilder {
    debug_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            debug_level: LogLevel::Off,
            appenders: Vec::new(),
        }
    }

    /// Set the process debug level
    #[must_use = "builder methods return a new value"]
    pub fn debug_level(mut self, level: LogLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    pub fn build(self) -> Logger {
        let logger = Logger::new();
        logger.set_debug_level(self.debug_level);
        for appender in self.appenders {
            logger.add_appender(appender);
        }
        logger
    }

    /// Build the Logger behind an `Arc`, ready to share across contexts
    pub fn build_shared(self) -> Arc<Logger> {
        Arc::new(self.build())
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
