//! # Rust Buffered Logger
//!
//! A leveled logger that moves formatting and I/O off the calling thread.
//!
//! ## Features
//!
//! - **Asynchronous**: lines travel through a bounded queue to one worker thread
//! - **Buffered**: output is batched and flushed after a quiet period
//! - **Rotating files**: size-based rotation with age and count pruning
//! - **Call sites**: every line names the file and line that logged it
//!
//! ```
//! use rust_buffered_logger::prelude::*;
//! use rust_buffered_logger::sinks::MemorySink;
//!
//! let out = MemorySink::new();
//! let logger = Logger::builder()
//!     .level(LogLevel::Info)
//!     .no_file()
//!     .sink(out.clone())
//!     .build()
//!     .unwrap();
//!
//! logger.debug("not written");
//! logger.warnf(format_args!("{} retries left", 2));
//! logger.flush().unwrap();
//!
//! assert!(out.contents().starts_with("[ Warn] "));
//! assert!(out.contents().ends_with(": 2 retries left\n"));
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, Result,
        TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::sinks::{RotatingFile, RotationPolicy};
}

pub use crate::core::{
    BasenameResolver, BufferedSink, CallSite, CallSiteResolver, FatalHook, FullPathResolver,
    LogEntry, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    RawWriter, Result, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT, FATAL_EXIT_CODE,
};
