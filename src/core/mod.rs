//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod log_context;
pub mod log_entry;
pub mod log_kind;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod metrics;

pub use appender::Appender;
pub use config::{AdapterConfig, VerbosityRule, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_CAPACITY};
pub use error::{Result, TlsLogError};
pub use log_context::{FieldValue, LogContext, RequestContext};
pub use log_entry::LogEntry;
pub use log_kind::LogKind;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use message::Message;
pub use metrics::{AdapterMetrics, LoggerMetrics};
