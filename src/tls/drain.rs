//! Draining the TLS library error queue into log records

use super::error_buffer::ErrorBuffer;
use super::error_queue::{ErrorQueue, ErrorRecord};
use super::session::{IoOutcome, SessionError, TlsSession};
use crate::core::{
    AdapterConfig, LogEntry, LogKind, LogLevel, Logger, Message, RequestContext, VerbosityRule,
};
use std::fmt::Write;
use std::panic::Location;
use std::sync::Arc;

/// Longest description kept from the library, matching its string buffer
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Where drained records go
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Global,
    Request(&'a RequestContext),
}

impl<'a> LogTarget<'a> {
    pub fn request(&self) -> Option<&'a RequestContext> {
        match *self {
            LogTarget::Global => None,
            LogTarget::Request(request) => Some(request),
        }
    }
}

/// Empties error queues into a `Logger` or an [`ErrorBuffer`]
///
/// A single queued error is logged on one line together with the prefix.
/// Several errors are logged as the prefix on its own line followed by one
/// line per error, oldest first.
///
/// # Example
///
/// ```
/// use tls_log_adapter::prelude::*;
/// use tls_log_adapter::tls::{ErrorCode, MemoryErrorQueue};
///
/// let (memory, records) = MemoryAppender::new();
/// let logger = Logger::builder().appender(memory).build_shared();
/// let drainer = ErrorDrainer::new(logger);
///
/// let mut queue = MemoryErrorQueue::new();
/// queue.push_error(ErrorCode::new(0x0A00_0086).unwrap(), "statem_clnt.c", 1889);
///
/// let drained = drainer.drain_and_log(
///     &mut queue,
///     Some(tls_msg!("Handshake with {} failed", "192.0.2.7")),
///     LogTarget::Global,
/// );
///
/// assert_eq!(drained, 1);
/// assert_eq!(
///     records.messages(),
///     vec!["Handshake with 192.0.2.7 failed: error:0A000086:lib(20)::reason(134)"]
/// );
/// ```
pub struct ErrorDrainer {
    logger: Arc<Logger>,
    request_verbosity: VerbosityRule,
    global_verbosity: VerbosityRule,
}

impl ErrorDrainer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self::from_config(logger, &AdapterConfig::default())
    }

    pub fn from_config(logger: Arc<Logger>, config: &AdapterConfig) -> Self {
        Self {
            logger,
            request_verbosity: config.request_verbosity,
            global_verbosity: config.global_verbosity,
        }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Whether records for `target` include the library's source location
    pub fn is_verbose(&self, target: LogTarget<'_>) -> bool {
        let rule = match target {
            LogTarget::Global => self.global_verbosity,
            LogTarget::Request(_) => self.request_verbosity,
        };
        rule.is_verbose(self.logger.debug_level(), target.request())
    }

    /// Empty `queue` into the log, returning the number of error records.
    ///
    /// With nothing queued only the prefix is logged, if given.
    #[track_caller]
    pub fn drain_and_log<Q>(
        &self,
        queue: &mut Q,
        prefix: Option<Message>,
        target: LogTarget<'_>,
    ) -> usize
    where
        Q: ErrorQueue + ?Sized,
    {
        self.drain_at(queue, prefix, target, Location::caller())
    }

    fn drain_at<Q>(
        &self,
        queue: &mut Q,
        prefix: Option<Message>,
        target: LogTarget<'_>,
        site: &'static Location<'static>,
    ) -> usize
    where
        Q: ErrorQueue + ?Sized,
    {
        let prefix = prefix.map(|p| p.render());
        let verbose = self.is_verbose(target);
        let first = queue.pop_error();

        if let Some(record) = &first {
            if !queue.peek_error() {
                let description = describe_record(&*queue, record, verbose);
                let message = match prefix {
                    Some(prefix) => format!("{}: {}", prefix, description),
                    None => description,
                };
                self.emit(target, error_kind(target), message, site);
                return 1;
            }
        }

        if let Some(prefix) = prefix {
            self.emit(target, LogKind::Error, prefix, site);
        }

        let mut drained = 0;
        let mut next = first;
        while let Some(record) = next {
            let message = describe_record(&*queue, &record, verbose);
            self.emit(target, error_kind(target), message, site);
            drained += 1;
            next = queue.pop_error();
        }
        drained
    }

    /// Empty `queue` into `buffer` instead of the log.
    ///
    /// The first message (prefix, first error, or both on one line) becomes
    /// the primary message; each further error is stacked beneath it.
    pub fn drain_to_buffer<Q>(
        queue: &mut Q,
        prefix: Option<Message>,
        buffer: &ErrorBuffer,
    ) -> usize
    where
        Q: ErrorQueue + ?Sized,
    {
        let prefix = prefix.map(|p| p.render());
        let first = queue.pop_error();

        let primary = match (prefix, &first) {
            (Some(prefix), Some(record)) => {
                format!("{}: {}", prefix, describe_record(&*queue, record, false))
            }
            (Some(prefix), None) => prefix,
            (None, Some(record)) => describe_record(&*queue, record, false),
            (None, None) => return 0,
        };
        buffer.set(primary);

        let mut drained = usize::from(first.is_some());
        while let Some(record) = queue.pop_error() {
            buffer.push(describe_record(&*queue, &record, false));
            drained += 1;
        }
        drained
    }

    /// Classify the result of a session I/O call.
    ///
    /// Queued errors are drained first. Transient results continue silently;
    /// fatal ones log one classified message.
    #[track_caller]
    pub fn classify_io<Q, S>(
        &self,
        queue: &mut Q,
        session: &S,
        ret: i32,
        prefix: Option<Message>,
        target: LogTarget<'_>,
    ) -> IoOutcome
    where
        Q: ErrorQueue + ?Sized,
        S: TlsSession + ?Sized,
    {
        let site = Location::caller();
        if queue.peek_error() {
            self.drain_at(queue, prefix, target, site);
        }

        let error = session.session_error(ret);
        if error.is_transient() {
            return IoOutcome::Continue;
        }

        let message = match error {
            SessionError::Syscall => format!("System call (I/O) error ({})", ret),
            SessionError::Ssl => format!("TLS protocol error ({})", ret),
            other => format!("TLS session error {} ({})", other.code(), ret),
        };
        self.emit(target, error_kind(target), message, site);
        IoOutcome::Fatal(error)
    }

    /// Discard everything queued without logging
    pub fn clear<Q>(queue: &mut Q) -> usize
    where
        Q: ErrorQueue + ?Sized,
    {
        queue.clear()
    }

    fn emit(
        &self,
        target: LogTarget<'_>,
        kind: LogKind,
        message: String,
        site: &'static Location<'static>,
    ) {
        let entry = LogEntry::new(kind, LogLevel::Off, message).with_site(site);
        match target {
            LogTarget::Global => self.logger.log_entry(entry),
            LogTarget::Request(request) => {
                self.logger.log_request_entry(request, entry);
            }
        }
    }
}

fn error_kind(target: LogTarget<'_>) -> LogKind {
    match target {
        LogTarget::Global => LogKind::Error,
        LogTarget::Request(_) => LogKind::DebugErrorRequest,
    }
}

/// `[file[line]:]description[:data]`
fn describe_record<Q>(queue: &Q, record: &ErrorRecord, verbose: bool) -> String
where
    Q: ErrorQueue + ?Sized,
{
    let mut out = String::new();
    if verbose {
        let _ = write!(out, "{}[{}]:", record.file, record.line);
    }
    out.push_str(truncate_at_boundary(
        &queue.describe(record.code),
        MAX_DESCRIPTION_LEN,
    ));
    if let Some(data) = record.string_data() {
        out.push(':');
        out.push_str(data);
    }
    out
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
