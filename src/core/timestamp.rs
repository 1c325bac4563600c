//! Timestamp prefixes for rendered lines
//!
//! Lines carry no timestamp by default. When a format is configured the
//! stamp is taken at the call site, in local time, and written before the
//! level tag.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Timestamp prefix options
///
/// # Examples
///
/// ```
/// use rust_buffered_logger::TimestampFormat;
/// use chrono::Local;
///
/// let stamp = TimestampFormat::Standard.format(&Local::now());
/// // e.g. "2025/01/08 10:30:45.123456"
/// assert_eq!(stamp.map(|s| s.len()), Some(26));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// No prefix
    #[default]
    None,

    /// Date, time and microseconds: `2025/01/08 10:30:45.123456`
    Standard,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123`
    Iso8601,

    /// RFC 3339 with offset: `2025-01-08T10:30:45.123+01:00`
    Rfc3339,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Render `datetime`, or `None` when no prefix is configured.
    ///
    /// A custom pattern chrono cannot render yields `None` instead of a
    /// partial stamp; [`validate`](Self::validate) rejects such patterns up front.
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> Option<String> {
        match self {
            TimestampFormat::None => None,
            TimestampFormat::Standard => Some(datetime.format("%Y/%m/%d %H:%M:%S%.6f").to_string()),
            TimestampFormat::Iso8601 => Some(datetime.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
            TimestampFormat::Rfc3339 => {
                Some(datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, false))
            }
            TimestampFormat::Custom(format_str) => {
                let mut stamp = String::new();
                write!(stamp, "{}", datetime.format(format_str)).ok()?;
                Some(stamp)
            }
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, TimestampFormat::None)
    }

    /// Check that a custom pattern only uses specifiers chrono understands
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an unknown or incomplete specifier
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format_str) = self {
            if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "timestamp",
                    format!("invalid strftime pattern '{}'", format_str),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_none_has_no_prefix() {
        assert_eq!(TimestampFormat::None.format(&fixed_datetime()), None);
        assert!(!TimestampFormat::None.is_enabled());
    }

    #[test]
    fn test_standard_format() {
        let result = TimestampFormat::Standard.format(&fixed_datetime());
        assert_eq!(result.as_deref(), Some("2025/01/08 10:30:45.123456"));
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result.as_deref(), Some("2025-01-08T10:30:45.123"));
    }

    #[test]
    fn test_rfc3339_format() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime()).unwrap();
        assert!(result.starts_with("2025-01-08T10:30:45.123"));
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y-%m-%d".to_string());
        assert_eq!(format.format(&fixed_datetime()).as_deref(), Some("2025-01-08"));
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let format = TimestampFormat::Custom("%Q".to_string());
        assert!(matches!(
            format.validate(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert_eq!(format.format(&fixed_datetime()), None);

        assert!(TimestampFormat::Custom("%H:%M %".to_string()).validate().is_err());
        assert!(TimestampFormat::Custom("%H:%M".to_string()).validate().is_ok());
        assert!(TimestampFormat::Standard.validate().is_ok());
    }

    #[test]
    fn test_serde_roundtrip_names() {
        let json = serde_json::to_string(&TimestampFormat::Standard).unwrap();
        assert_eq!(json, "\"standard\"");
        let parsed: TimestampFormat = serde_json::from_str("{\"custom\":\"%H\"}").unwrap();
        assert_eq!(parsed, TimestampFormat::Custom("%H".to_string()));
    }
}
