//! Log entry rendering
//!
//! A [`LogEntry`] is built on the producer side once the level gate has
//! accepted the call, and rendered straight into the text line that travels
//! through the queue.

use super::call_site::CallSite;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub site: CallSite,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    pub fn new(level: LogLevel, site: CallSite, message: String) -> Self {
        Self {
            level,
            site,
            message,
            timestamp: Local::now(),
        }
    }

    /// Render as `[<Level>] <file>:<line>: <message>\n`.
    ///
    /// The level name is right-aligned in five columns. A message that
    /// already ends in a newline does not get a second one.
    pub fn render(&self, timestamp_format: &TimestampFormat) -> String {
        let mut line = String::with_capacity(self.message.len() + self.site.file.len() + 24);

        if let Some(stamp) = timestamp_format.format(&self.timestamp) {
            line.push_str(&stamp);
            line.push(' ');
        }

        // Writing into a String cannot fail
        let _ = write!(line, "[{:>5}] {}: {}", self.level, self.site, self.message);

        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }
}
