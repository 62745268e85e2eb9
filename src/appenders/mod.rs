//! Appender implementations

pub mod channel;
#[cfg(feature = "console")]
pub mod console;
pub mod memory;

pub use channel::ChannelAppender;
#[cfg(feature = "console")]
pub use console::ConsoleAppender;
pub use memory::{MemoryAppender, MemoryRecords};

pub use crate::core::Appender;
