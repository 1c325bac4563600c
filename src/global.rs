//! Process-wide default logger
//!
//! [`init`] installs the default [`Logger`]; the free functions here forward
//! to it. Before `init` (or after [`shutdown`]) log calls are no-ops and
//! [`flush`] reports [`LoggerError::NotInitialized`].
//!
//! ```no_run
//! use rust_buffered_logger::{global, LoggerConfig, LogLevel};
//!
//! global::init(LoggerConfig {
//!     level: LogLevel::Info,
//!     ..LoggerConfig::default()
//! })
//! .unwrap();
//!
//! global::infof(format_args!("listening on {}", 8080));
//! global::flush().unwrap();
//! ```

use crate::core::{
    CallSite, LogLevel, Logger, LoggerConfig, LoggerError, RawWriter, Result,
    DEFAULT_SHUTDOWN_TIMEOUT, FATAL_EXIT_CODE,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

static DEFAULT_LOGGER: RwLock<Option<Arc<Logger>>> = parking_lot::const_rwlock(None);

/// Build a logger from `config` and make it the default.
///
/// A previously installed logger is shut down after the swap, so its
/// pending lines are still written.
///
/// # Errors
///
/// Returns error if the logger cannot be built; the current default is kept
pub fn init(config: LoggerConfig) -> Result<()> {
    let logger = Logger::new(config)?;
    install(logger);
    Ok(())
}

/// Make an already built logger the default, shutting down the previous one
pub fn install(logger: Logger) {
    let previous = DEFAULT_LOGGER.write().replace(Arc::new(logger));
    if let Some(previous) = previous {
        previous.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

/// Current default logger, if one is installed
pub fn default_logger() -> Option<Arc<Logger>> {
    DEFAULT_LOGGER.read().clone()
}

/// Remove the default logger and drain it.
///
/// Returns `false` if the worker did not finish within the shutdown timeout.
pub fn shutdown() -> bool {
    let current = DEFAULT_LOGGER.write().take();
    match current {
        Some(logger) => logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT),
        None => true,
    }
}

pub fn is_initialized() -> bool {
    DEFAULT_LOGGER.read().is_some()
}

#[track_caller]
pub fn log(level: LogLevel, message: impl fmt::Display) {
    if let Some(logger) = default_logger() {
        logger.log(level, message);
    }
}

#[track_caller]
pub fn logf(level: LogLevel, args: fmt::Arguments<'_>) {
    if let Some(logger) = default_logger() {
        logger.log(level, args);
    }
}

pub fn log_at(level: LogLevel, site: CallSite, message: impl fmt::Display) {
    if let Some(logger) = default_logger() {
        logger.log_at(level, site, message);
    }
}

/// Whether the default logger would write a line at `level`
pub fn enabled(level: LogLevel) -> bool {
    default_logger().is_some_and(|logger| logger.enabled(level))
}

#[track_caller]
pub fn trace(message: impl fmt::Display) {
    log(LogLevel::Trace, message);
}

#[track_caller]
pub fn tracef(args: fmt::Arguments<'_>) {
    logf(LogLevel::Trace, args);
}

#[track_caller]
pub fn debug(message: impl fmt::Display) {
    log(LogLevel::Debug, message);
}

#[track_caller]
pub fn debugf(args: fmt::Arguments<'_>) {
    logf(LogLevel::Debug, args);
}

#[track_caller]
pub fn info(message: impl fmt::Display) {
    log(LogLevel::Info, message);
}

#[track_caller]
pub fn infof(args: fmt::Arguments<'_>) {
    logf(LogLevel::Info, args);
}

#[track_caller]
pub fn warn(message: impl fmt::Display) {
    log(LogLevel::Warn, message);
}

#[track_caller]
pub fn warnf(args: fmt::Arguments<'_>) {
    logf(LogLevel::Warn, args);
}

#[track_caller]
pub fn error(message: impl fmt::Display) {
    log(LogLevel::Error, message);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    logf(LogLevel::Error, args);
}

/// Log at `Fatal` through the default logger and terminate.
///
/// Without a default logger the process exits immediately.
#[track_caller]
pub fn fatal(message: impl fmt::Display) {
    match default_logger() {
        Some(logger) => logger.fatal(message),
        None => std::process::exit(FATAL_EXIT_CODE),
    }
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    match default_logger() {
        Some(logger) => logger.fatalf(args),
        None => std::process::exit(FATAL_EXIT_CODE),
    }
}

/// Flush the default logger
///
/// # Errors
///
/// Returns [`LoggerError::NotInitialized`] before `init`, otherwise the sink's error
pub fn flush() -> Result<()> {
    default_logger()
        .ok_or(LoggerError::NotInitialized)?
        .flush()
}

pub fn discard_output() {
    if let Some(logger) = default_logger() {
        logger.discard_output();
    }
}

pub fn resume_output() {
    if let Some(logger) = default_logger() {
        logger.resume_output();
    }
}

/// Raw writer onto the default logger's buffer
pub fn raw_writer() -> Option<RawWriter> {
    default_logger().map(|logger| logger.raw_writer())
}
