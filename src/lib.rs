//! # TLS Log Adapter
//!
//! Bridges a TLS library's diagnostic output into a host logging facility.
//!
//! ## Features
//!
//! - **Log BIOs**: byte sinks that reassemble fragmented trace writes into
//!   whole lines, one per channel per execution context
//! - **Error draining**: empties the library's error queue into log records
//!   or an error-message slot, with optional source locations
//! - **Session classification**: turns I/O results into continue/fatal
//!   decisions with one classified message
//! - **Host facility**: `Logger` with debug-level gating and pluggable,
//!   panic-isolated appenders

pub mod appenders;
pub mod core;
pub mod macros;
pub mod tls;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleAppender;
    pub use crate::appenders::{ChannelAppender, MemoryAppender, MemoryRecords};
    pub use crate::core::{
        AdapterConfig, AdapterMetrics, Appender, FieldValue, LogContext, LogEntry, LogKind,
        LogLevel, Logger, LoggerBuilder, LoggerMetrics, Message, RequestContext, Result,
        TlsLogError, VerbosityRule,
    };
    pub use crate::tls::{
        BioWrite, Channel, ErrorBuffer, ErrorDrainer, ErrorQueue, ExecutionContext, IoOutcome,
        LogBio, LogTarget, SessionError, TlsSession,
    };
    pub use crate::tls_msg;
}

#[cfg(feature = "console")]
pub use appenders::ConsoleAppender;
pub use appenders::{ChannelAppender, MemoryAppender, MemoryRecords};
pub use core::{
    AdapterConfig, AdapterMetrics, Appender, FieldValue, LogContext, LogEntry, LogKind, LogLevel,
    Logger, LoggerBuilder, LoggerMetrics, Message, RequestContext, Result, TlsLogError,
    VerbosityRule, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_CAPACITY,
};
pub use tls::{
    BioId, BioWrite, Binding, Channel, ErrorBuffer, ErrorCode, ErrorDrainer, ErrorQueue,
    ErrorRecord, ExecutionContext, IoOutcome, LineAggregator, LogBio, LogTarget,
    MemoryErrorQueue, SessionError, TlsSession,
};
