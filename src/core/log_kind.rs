//! Record classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The type of log message a record represents.
///
/// Error kinds bypass the request debug gate; everything else is subject to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    #[default]
    Info,
    Warn,
    Error,
    Auth,
    Debug,
    DebugInfo,
    DebugWarn,
    DebugError,
    DebugWarnRequest,
    DebugErrorRequest,
}

impl LogKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogKind::Info => "INFO",
            LogKind::Warn => "WARN",
            LogKind::Error => "ERROR",
            LogKind::Auth => "AUTH",
            LogKind::Debug => "DEBUG",
            LogKind::DebugInfo => "DEBUG_INFO",
            LogKind::DebugWarn => "DEBUG_WARN",
            LogKind::DebugError => "DEBUG_ERROR",
            LogKind::DebugWarnRequest => "DEBUG_WARN_REQ",
            LogKind::DebugErrorRequest => "DEBUG_ERROR_REQ",
        }
    }

    /// Kinds routed through the request error path
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            LogKind::Error | LogKind::DebugError | LogKind::DebugErrorRequest
        )
    }

    pub fn is_debug(&self) -> bool {
        matches!(
            self,
            LogKind::Debug
                | LogKind::DebugInfo
                | LogKind::DebugWarn
                | LogKind::DebugError
                | LogKind::DebugWarnRequest
                | LogKind::DebugErrorRequest
        )
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogKind::Info | LogKind::DebugInfo => Green,
            LogKind::Auth => Cyan,
            LogKind::Debug => Blue,
            LogKind::Warn | LogKind::DebugWarn | LogKind::DebugWarnRequest => Yellow,
            LogKind::Error => BrightRed,
            LogKind::DebugError | LogKind::DebugErrorRequest => Red,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INFO" => Ok(LogKind::Info),
            "WARN" | "WARNING" => Ok(LogKind::Warn),
            "ERROR" | "ERR" => Ok(LogKind::Error),
            "AUTH" => Ok(LogKind::Auth),
            "DEBUG" | "DBG" => Ok(LogKind::Debug),
            "DEBUG_INFO" => Ok(LogKind::DebugInfo),
            "DEBUG_WARN" => Ok(LogKind::DebugWarn),
            "DEBUG_ERROR" => Ok(LogKind::DebugError),
            "DEBUG_WARN_REQ" => Ok(LogKind::DebugWarnRequest),
            "DEBUG_ERROR_REQ" => Ok(LogKind::DebugErrorRequest),
            _ => Err(format!("Invalid log kind: '{}'", s)),
        }
    }
}
