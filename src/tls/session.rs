//! Session error classification for TLS I/O results

use std::fmt;

/// Classification the TLS library gives the result of a session I/O call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionError {
    None,
    /// Protocol failure
    Ssl,
    WantRead,
    WantWrite,
    WantX509Lookup,
    /// Transport failure below the TLS layer
    Syscall,
    /// Peer closed the TLS connection cleanly
    ZeroReturn,
    /// Any classification this adapter has no handling for
    Other(i32),
}

impl SessionError {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => SessionError::None,
            1 => SessionError::Ssl,
            2 => SessionError::WantRead,
            3 => SessionError::WantWrite,
            4 => SessionError::WantX509Lookup,
            5 => SessionError::Syscall,
            6 => SessionError::ZeroReturn,
            other => SessionError::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            SessionError::None => 0,
            SessionError::Ssl => 1,
            SessionError::WantRead => 2,
            SessionError::WantWrite => 3,
            SessionError::WantX509Lookup => 4,
            SessionError::Syscall => 5,
            SessionError::ZeroReturn => 6,
            SessionError::Other(code) => *code,
        }
    }

    /// Whether the session can continue after this result
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::None
                | SessionError::WantRead
                | SessionError::WantWrite
                | SessionError::WantX509Lookup
                | SessionError::ZeroReturn
        )
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            SessionError::None => "none",
            SessionError::Ssl => "ssl",
            SessionError::WantRead => "want_read",
            SessionError::WantWrite => "want_write",
            SessionError::WantX509Lookup => "want_x509_lookup",
            SessionError::Syscall => "syscall",
            SessionError::ZeroReturn => "zero_return",
            SessionError::Other(_) => "unhandled",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Other(code) => write!(f, "unhandled({})", code),
            other => f.write_str(other.to_str()),
        }
    }
}

/// A TLS session able to classify the return value of its last I/O call
pub trait TlsSession {
    fn session_error(&self, ret: i32) -> SessionError;
}

impl<F> TlsSession for F
where
    F: Fn(i32) -> SessionError,
{
    fn session_error(&self, ret: i32) -> SessionError {
        self(ret)
    }
}

/// Result of classifying a session I/O call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOutcome {
    Continue,
    Fatal(SessionError),
}

impl IoOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, IoOutcome::Fatal(_))
    }
}
