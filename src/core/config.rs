//! Logger configuration
//!
//! [`LoggerConfig`] is the plain, serializable part of a logger's setup.
//! Extra sinks, the call-site resolver and the fatal hook are not
//! serializable and live on [`LoggerBuilder`](super::logger::LoggerBuilder).

use super::buffered_sink::DEFAULT_BUFFER_CAPACITY;
use super::debounce::DEFAULT_FLUSH_INTERVAL;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use crate::sinks::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default capacity of the message queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// Default log file
pub const DEFAULT_FILENAME: &str = "./log.log";

/// Logger settings, fixed at construction.
///
/// Missing JSON fields take their defaults; the level name is matched
/// case-insensitively and an unknown name is rejected.
///
/// ```
/// use rust_buffered_logger::{LogLevel, LoggerConfig};
///
/// let config = LoggerConfig::from_json_str(r#"{ "level": "INFO", "max_backups": 3 }"#).unwrap();
/// assert_eq!(config.level, LogLevel::Info);
/// assert_eq!(config.max_backups, 3);
/// assert_eq!(config.max_size_mb, 10);
///
/// assert!(LoggerConfig::from_json_str(r#"{ "level": "loud" }"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Least severe level that is still written
    pub level: LogLevel,
    /// Rotating log file; `None` writes only to the extra sinks
    pub filename: Option<PathBuf>,
    pub max_size_mb: u64,
    pub max_age_days: u64,
    pub max_backups: usize,
    /// Local time (rather than UTC) in backup file names
    pub local_time: bool,
    /// Gzip rotated backups
    pub compress: bool,
    pub queue_capacity: usize,
    pub buffer_capacity: usize,
    /// Quiet period before buffered output is flushed
    pub flush_interval_ms: u64,
    pub timestamp: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let rotation = RotationPolicy::default();
        Self {
            level: LogLevel::Debug,
            filename: Some(PathBuf::from(DEFAULT_FILENAME)),
            max_size_mb: rotation.max_size_mb,
            max_age_days: rotation.max_age_days,
            max_backups: rotation.max_backups,
            local_time: rotation.local_time,
            compress: rotation.compress,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
            timestamp: TimestampFormat::None,
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config("queue_capacity", "must be greater than 0"));
        }
        if self.buffer_capacity == 0 {
            return Err(LoggerError::config("buffer_capacity", "must be greater than 0"));
        }
        if self.max_size_mb == 0 {
            return Err(LoggerError::config("max_size_mb", "must be greater than 0"));
        }
        if self.flush_interval_ms == 0 {
            return Err(LoggerError::config("flush_interval_ms", "must be greater than 0"));
        }
        if let Some(path) = &self.filename {
            if path.as_os_str().is_empty() {
                return Err(LoggerError::config("filename", "must not be empty"));
            }
            // a full buffer is flushed as one write, which the file must accept
            let max_bytes = self.rotation_policy().max_bytes();
            if self.buffer_capacity as u64 > max_bytes {
                return Err(LoggerError::config(
                    "buffer_capacity",
                    format!(
                        "{} bytes exceeds the {} byte file size limit",
                        self.buffer_capacity, max_bytes
                    ),
                ));
            }
        }
        self.timestamp.validate()
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size_mb(self.max_size_mb)
            .with_max_age_days(self.max_age_days)
            .with_max_backups(self.max_backups)
            .with_local_time(self.local_time)
            .with_compression(self.compress)
    }
}
