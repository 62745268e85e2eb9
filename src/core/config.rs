//! Adapter configuration
//!
//! Controls the line aggregation buffer bounds and the two verbosity rules
//! the error drainer consults when deciding whether to include source
//! location data in single-line and per-error records.

use super::error::{Result, TlsLogError};
use super::log_context::RequestContext;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// Default starting size of a line aggregation buffer (1 KiB)
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Default hard ceiling of a line aggregation buffer (10 KiB)
pub const DEFAULT_MAX_CAPACITY: usize = 10 * 1024;

/// Decides whether a drained error is rendered in verbose form.
///
/// Request-bound and global drains each have their own rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule", content = "level")]
pub enum VerbosityRule {
    Never,
    Always,
    /// Verbose when the process debug level reaches the given level
    Process(LogLevel),
    /// Verbose when either the request or the process reaches the given level
    RequestOrProcess(LogLevel),
}

impl VerbosityRule {
    pub fn is_verbose(&self, process: LogLevel, request: Option<&RequestContext>) -> bool {
        match self {
            VerbosityRule::Never => false,
            VerbosityRule::Always => true,
            VerbosityRule::Process(level) => process.allows(*level),
            VerbosityRule::RequestOrProcess(level) => {
                request.is_some_and(|r| r.debug_enabled(*level)) || process.allows(*level)
            }
        }
    }
}

/// Configuration for log BIOs and the error drainer
///
/// # Example
///
/// ```
/// use tls_log_adapter::{AdapterConfig, VerbosityRule, LogLevel};
///
/// let config = AdapterConfig::from_json(r#"{
///     "max_capacity": 4096,
///     "global_verbosity": { "rule": "process", "level": "lvl2" }
/// }"#).unwrap();
///
/// assert_eq!(config.initial_capacity, 1024);
/// assert_eq!(config.global_verbosity, VerbosityRule::Process(LogLevel::Lvl2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Starting size of each BIO's aggregation buffer, restored on rebind
    pub initial_capacity: usize,

    /// Size beyond which an unterminated line is truncated
    pub max_capacity: usize,

    /// Verbosity rule for drains logged against a request
    pub request_verbosity: VerbosityRule,

    /// Verbosity rule for drains logged to the global channel
    pub global_verbosity: VerbosityRule,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
            request_verbosity: VerbosityRule::RequestOrProcess(LogLevel::Lvl3),
            global_verbosity: VerbosityRule::Process(LogLevel::Lvl3),
        }
    }
}

impl AdapterConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AdapterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn with_capacity(mut self, initial: usize, max: usize) -> Self {
        self.initial_capacity = initial;
        self.max_capacity = max;
        self
    }

    #[must_use]
    pub fn with_request_verbosity(mut self, rule: VerbosityRule) -> Self {
        self.request_verbosity = rule;
        self
    }

    #[must_use]
    pub fn with_global_verbosity(mut self, rule: VerbosityRule) -> Self {
        self.global_verbosity = rule;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(TlsLogError::config(
                "AdapterConfig",
                "initial_capacity must be greater than zero",
            ));
        }
        // One byte is reserved for the terminator of a truncated line
        if self.max_capacity < 2 {
            return Err(TlsLogError::config(
                "AdapterConfig",
                "max_capacity must be at least 2",
            ));
        }
        if self.initial_capacity > self.max_capacity {
            return Err(TlsLogError::config(
                "AdapterConfig",
                format!(
                    "initial_capacity ({}) exceeds max_capacity ({})",
                    self.initial_capacity, self.max_capacity
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::default();
        assert_eq!(config.initial_capacity, 1024);
        assert_eq!(config.max_capacity, 10240);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_inverted_bounds() {
        let config = AdapterConfig::default().with_capacity(4096, 1024);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds max_capacity"));

        assert!(AdapterConfig::default().with_capacity(0, 10).validate().is_err());
        assert!(AdapterConfig::default().with_capacity(1, 1).validate().is_err());
    }

    #[test]
    fn test_from_json_validates() {
        let err = AdapterConfig::from_json(r#"{"initial_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, TlsLogError::InvalidConfiguration { .. }));

        let err = AdapterConfig::from_json("42").unwrap_err();
        assert!(matches!(err, TlsLogError::JsonError(_)));
    }

    #[test]
    fn test_json_roundtrip_keeps_rules() {
        let config = AdapterConfig::default().with_request_verbosity(VerbosityRule::Never);
        let json = config.to_json().unwrap();
        assert_eq!(AdapterConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_request_or_process_rule() {
        let rule = VerbosityRule::RequestOrProcess(LogLevel::Lvl3);
        let quiet = RequestContext::new("a").with_debug_level(LogLevel::Lvl1);
        let loud = RequestContext::new("b").with_debug_level(LogLevel::Lvl3);

        assert!(!rule.is_verbose(LogLevel::Off, Some(&quiet)));
        assert!(rule.is_verbose(LogLevel::Off, Some(&loud)));
        assert!(rule.is_verbose(LogLevel::Lvl3, Some(&quiet)));
        assert!(!rule.is_verbose(LogLevel::Lvl2, None));
    }

    #[test]
    fn test_process_rule_ignores_request() {
        let rule = VerbosityRule::Process(LogLevel::Lvl3);
        let loud = RequestContext::new("b").with_debug_level(LogLevel::Lvl4);

        assert!(!rule.is_verbose(LogLevel::Lvl1, Some(&loud)));
        assert!(rule.is_verbose(LogLevel::Lvl4, None));
    }
}
