//! Log BIO: the byte sink handed to the TLS library
//!
//! A `LogBio` accepts the library's trace writes, reassembles them into lines
//! and forwards each line to the host `Logger` with the kind, level and
//! request binding of its most recent acquisition.

use super::aggregator::LineAggregator;
use crate::core::{
    AdapterConfig, AdapterMetrics, LogEntry, LogKind, LogLevel, Logger, RequestContext,
};
use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_BIO_ID: AtomicU64 = AtomicU64::new(1);

/// Logging destination of a BIO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Bound to a request; lines pass the request's debug gate
    Request,
    /// Process-wide; lines pass the process debug gate
    Global,
}

impl Channel {
    pub fn to_str(&self) -> &'static str {
        match self {
            Channel::Request => "request",
            Channel::Global => "global",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Process-unique handle of a BIO, stable across rebinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BioId(u64);

impl BioId {
    fn next() -> Self {
        BioId(NEXT_BIO_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bio#{}", self.0)
    }
}

/// Narrow write contract of a library BIO
pub trait BioWrite {
    /// Accept raw bytes; returns the full length even when bytes were dropped
    fn bio_write(&mut self, data: &[u8]) -> usize;

    fn bio_puts(&mut self, s: &str) -> usize {
        self.bio_write(s.as_bytes())
    }
}

/// Metadata applied to a BIO on each acquisition
#[derive(Clone)]
pub struct Binding {
    pub logger: Arc<Logger>,
    pub request: Option<Arc<RequestContext>>,
    pub kind: LogKind,
    pub level: LogLevel,
}

impl Binding {
    pub fn global(logger: Arc<Logger>, kind: LogKind, level: LogLevel) -> Self {
        Self {
            logger,
            request: None,
            kind,
            level,
        }
    }

    pub fn request(
        logger: Arc<Logger>,
        request: Arc<RequestContext>,
        kind: LogKind,
        level: LogLevel,
    ) -> Self {
        Self {
            logger,
            request: Some(request),
            kind,
            level,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("request", &self.request.as_ref().map(|r| r.name()))
            .field("kind", &self.kind)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Line-buffering BIO owned by an [`ExecutionContext`](super::ExecutionContext)
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use tls_log_adapter::prelude::*;
///
/// let (memory, records) = MemoryAppender::new();
/// let logger = Logger::builder()
///     .debug_level(LogLevel::Lvl3)
///     .appender(memory)
///     .build_shared();
///
/// let mut ctx = ExecutionContext::new();
/// let bio = ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl3);
/// write!(bio, "SSL_accept:before SSL initialization\nSSL_acc").unwrap();
///
/// assert_eq!(records.messages(), vec!["SSL_accept:before SSL initialization"]);
/// ```
#[derive(Debug)]
pub struct LogBio {
    id: BioId,
    channel: Channel,
    aggregator: LineAggregator,
    binding: Binding,
    bind_site: &'static Location<'static>,
}

impl LogBio {
    pub(crate) fn new(
        channel: Channel,
        config: &AdapterConfig,
        binding: Binding,
        bind_site: &'static Location<'static>,
        metrics: Arc<AdapterMetrics>,
    ) -> Self {
        Self {
            id: BioId::next(),
            channel,
            aggregator: LineAggregator::from_config(config).with_metrics(metrics),
            binding,
            bind_site,
        }
    }

    /// Overwrite the binding and drop any pending fragment
    pub(crate) fn rebind(
        &mut self,
        binding: Binding,
        bind_site: &'static Location<'static>,
    ) -> bool {
        self.binding = binding;
        self.bind_site = bind_site;
        self.aggregator.reset()
    }

    pub fn id(&self) -> BioId {
        self.id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn kind(&self) -> LogKind {
        self.binding.kind
    }

    pub fn level(&self) -> LogLevel {
        self.binding.level
    }

    pub fn request(&self) -> Option<&RequestContext> {
        self.binding.request.as_deref()
    }

    /// Source location of the last acquisition
    pub fn bind_site(&self) -> &'static Location<'static> {
        self.bind_site
    }

    pub fn aggregator(&self) -> &LineAggregator {
        &self.aggregator
    }

    fn emit(binding: &Binding, bind_site: &'static Location<'static>, line: String) {
        let entry = LogEntry::trace(binding.kind, binding.level, line).with_site(bind_site);
        match &binding.request {
            Some(request) => binding.logger.log_request_entry(request, entry),
            None => binding.logger.log_global_entry(entry),
        };
    }
}

impl BioWrite for LogBio {
    fn bio_write(&mut self, data: &[u8]) -> usize {
        let Self {
            aggregator,
            binding,
            bind_site,
            ..
        } = self;
        let site = *bind_site;
        aggregator.feed(data, |line| Self::emit(binding, site, line))
    }
}

impl io::Write for LogBio {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.bio_write(buf))
    }

    /// Pending fragments are only emitted once terminated
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::MemoryAppender;

    fn bio_with(channel: Channel, binding: Binding) -> LogBio {
        LogBio::new(
            channel,
            &AdapterConfig::default(),
            binding,
            Location::caller(),
            Arc::new(AdapterMetrics::new()),
        )
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(BioId::next(), BioId::next());
    }

    #[test]
    fn test_global_lines_respect_process_level() {
        let (memory, records) = MemoryAppender::new();
        let logger = Logger::builder()
            .debug_level(LogLevel::Lvl2)
            .appender(memory)
            .build_shared();

        let mut quiet = bio_with(
            Channel::Global,
            Binding::global(logger.clone(), LogKind::Debug, LogLevel::Lvl3),
        );
        assert_eq!(quiet.bio_puts("hidden\n"), 7);
        assert!(records.is_empty());

        let mut loud = bio_with(
            Channel::Global,
            Binding::global(logger, LogKind::Debug, LogLevel::Lvl2),
        );
        loud.bio_puts("shown\n");
        assert_eq!(records.messages(), vec!["shown"]);
    }

    #[test]
    fn test_request_lines_carry_request_and_site() {
        let (memory, records) = MemoryAppender::new();
        let logger = Logger::builder().appender(memory).build_shared();
        let request = Arc::new(RequestContext::new("req-3").with_debug_level(LogLevel::Lvl4));

        let mut bio = bio_with(
            Channel::Request,
            Binding::request(logger, request, LogKind::DebugInfo, LogLevel::Lvl4),
        );
        bio.bio_write(b"read server hello\n");

        let entries = records.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogKind::DebugInfo);
        assert_eq!(entries[0].request.as_deref(), Some("req-3"));
        assert_eq!(entries[0].file.as_deref(), Some(bio.bind_site().file()));
    }

    #[test]
    fn test_rebind_discards_fragment() {
        let (memory, records) = MemoryAppender::new();
        let logger = Logger::builder()
            .debug_level(LogLevel::Lvl1)
            .appender(memory)
            .build_shared();
        let binding = Binding::global(logger, LogKind::Debug, LogLevel::Lvl1);

        let mut bio = bio_with(Channel::Global, binding.clone());
        bio.bio_write(b"half a li");
        assert!(bio.rebind(binding, Location::caller()));
        bio.bio_write(b"ne\n");

        assert_eq!(records.messages(), vec!["ne"]);
    }

    #[test]
    fn test_trace_bytes_reach_logger_unchanged() {
        let (memory, records) = MemoryAppender::new();
        let logger = Logger::builder()
            .debug_level(LogLevel::Lvl1)
            .appender(memory)
            .build_shared();

        let mut bio = bio_with(
            Channel::Global,
            Binding::global(logger, LogKind::Debug, LogLevel::Lvl1),
        );
        bio.bio_write(b"\tVersion: 3\r\n");
        bio.bio_write(b"Issuer:\tCN=Example CA\r\n");

        assert_eq!(
            records.messages(),
            vec!["\tVersion: 3\r", "Issuer:\tCN=Example CA\r"]
        );
    }
}
