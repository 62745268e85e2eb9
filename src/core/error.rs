//! Error types for the TLS log adapter

pub type Result<T> = std::result::Result<T, TlsLogError>;

#[derive(Debug, thiserror::Error)]
pub enum TlsLogError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A request log BIO was acquired without a request to bind to
    #[error("Channel '{channel}' requires a request binding")]
    MissingRequest { channel: String },

    /// The thread's execution context is already borrowed further up the stack
    #[error("Execution context for thread '{thread}' is already in use")]
    ContextBusy { thread: String },

    /// Appender failure with the appender's name
    #[error("Appender '{appender}' failed: {message}")]
    AppenderError { appender: String, message: String },

    /// Channel send error
    #[error("Failed to hand log entry to receiving thread")]
    ChannelSendError,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl TlsLogError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        TlsLogError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a missing request binding error
    pub fn missing_request(channel: impl Into<String>) -> Self {
        TlsLogError::MissingRequest {
            channel: channel.into(),
        }
    }

    /// Create a busy context error for the current thread
    pub fn context_busy() -> Self {
        let current = std::thread::current();
        TlsLogError::ContextBusy {
            thread: current
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("{:?}", current.id())),
        }
    }

    /// Create an appender error
    pub fn appender(appender: impl Into<String>, message: impl Into<String>) -> Self {
        TlsLogError::AppenderError {
            appender: appender.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TlsLogError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TlsLogError::config("AdapterConfig", "initial_capacity must be > 0");
        assert!(matches!(err, TlsLogError::InvalidConfiguration { .. }));

        let err = TlsLogError::missing_request("request");
        assert!(matches!(err, TlsLogError::MissingRequest { .. }));

        let err = TlsLogError::appender("memory", "poisoned");
        assert!(matches!(err, TlsLogError::AppenderError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = TlsLogError::config("AdapterConfig", "max_capacity too small");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for AdapterConfig: max_capacity too small"
        );

        let err = TlsLogError::missing_request("request");
        assert_eq!(
            err.to_string(),
            "Channel 'request' requires a request binding"
        );

        let err = TlsLogError::appender("console", "stdout closed");
        assert_eq!(err.to_string(), "Appender 'console' failed: stdout closed");
    }

    #[test]
    fn test_context_busy_names_thread() {
        let handle = std::thread::Builder::new()
            .name("tls-worker".to_string())
            .spawn(|| TlsLogError::context_busy().to_string())
            .unwrap();
        let message = handle.join().unwrap();
        assert!(message.contains("tls-worker"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: TlsLogError = parse.unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error"));
    }
}
