//! Logging macros for ergonomic message formatting.
//!
//! The logging macros format like `format!` and write through a `Logger`;
//! `tls_msg!` builds a deferred [`Message`](crate::Message) for the error
//! drainer instead.
//!
//! # Examples
//!
//! ```
//! use tls_log_adapter::prelude::*;
//! use tls_log_adapter::{debug, info};
//!
//! let (memory, records) = MemoryAppender::new();
//! let logger = Logger::builder()
//!     .debug_level(LogLevel::Lvl2)
//!     .appender(memory)
//!     .build();
//!
//! info!(logger, "TLS listener ready on port {}", 2083);
//! debug!(logger, LogLevel::Lvl2, "Loaded {} CA certificates", 148);
//! debug!(logger, LogLevel::Lvl4, "not shown");
//!
//! assert_eq!(records.len(), 2);
//! ```

/// Log a message of the given kind, ignoring the debug level.
///
/// # Examples
///
/// ```
/// # use tls_log_adapter::prelude::*;
/// # let logger = Logger::new();
/// use tls_log_adapter::log;
/// log!(logger, LogKind::Auth, "Login OK for {}", "bob");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $kind:expr, $($arg:tt)+) => {
        $logger.log($kind, format!($($arg)+))
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogKind::Info, $($arg)+)
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogKind::Warn, $($arg)+)
    };
}

/// Log an error message.
///
/// # Examples
///
/// ```
/// # use tls_log_adapter::prelude::*;
/// # let logger = Logger::new();
/// use tls_log_adapter::error;
/// error!(logger, "Failed loading private key {}", "/etc/tls/server.key");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogKind::Error, $($arg)+)
    };
}

/// Log a debug message if the process debug level reaches `level`.
///
/// Evaluates to whether the message passed the gate.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.debug($level, format!($($arg)+))
    };
}

/// Build a [`Message`](crate::Message) from a template and positional
/// arguments.
///
/// # Examples
///
/// ```
/// use tls_log_adapter::tls_msg;
///
/// let msg = tls_msg!("Failed binding to {}:{}", "0.0.0.0", 2083);
/// assert_eq!(msg.args().len(), 2);
/// assert_eq!(msg.render(), "Failed binding to 0.0.0.0:2083");
/// ```
#[macro_export]
macro_rules! tls_msg {
    ($template:expr $(,)?) => {
        $crate::Message::new($template)
    };
    ($template:expr, $($arg:expr),+ $(,)?) => {
        $crate::Message::new($template)$(.arg($arg))+
    };
}
