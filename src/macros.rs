//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They expand to the
//! `*f` facade methods, so the call site printed on the line is the macro
//! invocation.
//!
//! # Examples
//!
//! ```
//! use rust_buffered_logger::prelude::*;
//! use rust_buffered_logger::info;
//!
//! let logger = Logger::builder().no_file().sink(std::io::sink()).build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// Unlike [`fatal!`](crate::fatal), `log!` at `LogLevel::Fatal` does not
/// terminate the process.
///
/// # Examples
///
/// ```
/// # use rust_buffered_logger::prelude::*;
/// # let logger = Logger::builder().no_file().sink(std::io::sink()).build().unwrap();
/// use rust_buffered_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, format_args!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_buffered_logger::prelude::*;
/// # let logger = Logger::builder()
/// #     .level(LogLevel::Trace)
/// #     .no_file()
/// #     .sink(std::io::sink())
/// #     .build()
/// #     .unwrap();
/// use rust_buffered_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.tracef(format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(format_args!($($arg)+))
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(format_args!($($arg)+))
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_buffered_logger::prelude::*;
/// # let logger = Logger::builder().no_file().sink(std::io::sink()).build().unwrap();
/// use rust_buffered_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(format_args!($($arg)+))
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(format_args!($($arg)+))
    };
}

/// Log a fatal-level message, flush, then run the logger's fatal hook.
///
/// With the default hook this exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, Logger};
    use crate::sinks::MemorySink;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn logger_with(level: LogLevel) -> (Logger, MemorySink) {
        let out = MemorySink::new();
        let logger = Logger::builder()
            .level(level)
            .no_file()
            .sink(out.clone())
            .build()
            .unwrap();
        (logger, out)
    }

    #[test]
    fn test_log_macro() {
        let (logger, out) = logger_with(LogLevel::Info);
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Debug, "Formatted: {}", 42);
        logger.flush().unwrap();

        let lines = out.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("Test message"));
    }

    #[test]
    fn test_macro_reports_invocation_line() {
        let (logger, out) = logger_with(LogLevel::Trace);
        let line = line!() + 1;
        warn!(logger, "Retry {} of {}", 1, 3);
        logger.flush().unwrap();

        assert_eq!(
            out.contents(),
            format!("[ Warn] macros.rs:{}: Retry 1 of 3\n", line)
        );
    }

    #[test]
    fn test_level_macros() {
        let (logger, out) = logger_with(LogLevel::Trace);
        trace!(logger, "Value: {}", 10);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        error!(logger, "Code: {}", 500);
        logger.flush().unwrap();

        let tags: Vec<String> = out.lines().iter().map(|l| l[..7].to_string()).collect();
        assert_eq!(tags, vec!["[Trace]", "[Debug]", "[ Info]", "[Error]"]);
    }

    #[test]
    fn test_fatal_macro_runs_hook() {
        let out = MemorySink::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let logger = Logger::builder()
            .no_file()
            .sink(out.clone())
            .on_fatal(Arc::new(move |_| flag.store(true, Ordering::SeqCst)))
            .build()
            .unwrap();

        fatal!(logger, "Critical failure: {}", "system");

        assert!(fired.load(Ordering::SeqCst));
        assert!(out.contents().ends_with("Critical failure: system\n"));
    }
}
