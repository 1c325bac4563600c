//! Core logger types

pub mod buffered_sink;
pub mod call_site;
pub mod config;
pub mod debounce;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod timestamp;
pub(crate) mod worker;

pub use buffered_sink::{BufferedSink, RawWriter, Sink, DEFAULT_BUFFER_CAPACITY};
pub use call_site::{BasenameResolver, CallSite, CallSiteResolver, FullPathResolver};
pub use config::{LoggerConfig, DEFAULT_FILENAME, DEFAULT_QUEUE_CAPACITY};
pub use debounce::{Debouncer, TimerState, DEFAULT_FLUSH_INTERVAL};
pub use error::{LoggerError, Result};
pub use log_entry::LogEntry;
pub use log_level::{should_emit, LogLevel};
pub use logger::{FatalHook, Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
pub use timestamp::TimestampFormat;
