//! Debug verbosity levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Debug verbosity, from silent to most verbose.
///
/// The process and every request carry a current level; a record bound at
/// level `N` is only emitted where the current level is at least `N`.
/// `Off` as a record level means the record is always emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Off = 0,
    Lvl1 = 1,
    Lvl2 = 2,
    Lvl3 = 3,
    Lvl4 = 4,
}

impl LogLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "OFF",
            LogLevel::Lvl1 => "LVL1",
            LogLevel::Lvl2 => "LVL2",
            LogLevel::Lvl3 => "LVL3",
            LogLevel::Lvl4 => "LVL4",
        }
    }

    /// Numeric verbosity, `0` for `Off`
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Build a level from its numeric verbosity, clamping anything above 4
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Off,
            1 => LogLevel::Lvl1,
            2 => LogLevel::Lvl2,
            3 => LogLevel::Lvl3,
            _ => LogLevel::Lvl4,
        }
    }

    /// Whether a record bound at `level` passes when this is the current level
    #[inline]
    pub fn allows(&self, level: LogLevel) -> bool {
        *self >= level
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFF" | "0" => Ok(LogLevel::Off),
            "LVL1" | "1" => Ok(LogLevel::Lvl1),
            "LVL2" | "2" => Ok(LogLevel::Lvl2),
            "LVL3" | "3" => Ok(LogLevel::Lvl3),
            "LVL4" | "4" | "MAX" => Ok(LogLevel::Lvl4),
            _ => Err(format!("Invalid debug level: '{}'", s)),
        }
    }
}
