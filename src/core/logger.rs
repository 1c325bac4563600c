//! Main logger implementation
//!
//! The [`Logger`] is the producer side of the pipeline: it applies the level
//! gate, resolves the call site, renders the line and enqueues it. A single
//! worker thread per logger owns the write path (see `worker`).

use super::{
    buffered_sink::{BufferedSink, RawWriter, Sink},
    call_site::{BasenameResolver, CallSite, CallSiteResolver},
    config::LoggerConfig,
    debounce::Debouncer,
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::{should_emit, LogLevel},
    metrics::LoggerMetrics,
    timestamp::TimestampFormat,
    worker::{self, Message},
};
use crate::sinks::{MultiSink, RotatingFile};
use crossbeam_channel::{bounded, Sender};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::io::Write;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// This timeout is used when the logger is dropped without explicit shutdown.
/// For custom timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Process exit status used after a fatal line
pub const FATAL_EXIT_CODE: i32 = 1;

/// Called with [`FATAL_EXIT_CODE`] once a fatal line has been flushed.
///
/// The default hook exits the process.
pub type FatalHook = Arc<dyn Fn(i32) + Send + Sync>;

fn exit_process() -> FatalHook {
    Arc::new(|code| std::process::exit(code))
}

pub struct Logger {
    threshold: LogLevel,
    timestamp_format: TimestampFormat,
    resolver: Arc<dyn CallSiteResolver>,
    sender: RwLock<Option<Sender<Message>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    sink: Arc<Mutex<BufferedSink>>,
    metrics: Arc<LoggerMetrics>,
    on_fatal: FatalHook,
}

impl Logger {
    /// Build a logger from a configuration value
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the log file cannot be opened
    pub fn new(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use rust_buffered_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .level(LogLevel::Info)
    ///     .filename("/var/log/app.log")
    ///     .build()
    ///     .unwrap();
    /// logger.info("service started");
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Least severe level this logger writes
    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    /// Whether a line at `level` would be written
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        should_emit(level, self.threshold)
    }

    /// Log `message` at `level`, attributed to the caller.
    ///
    /// A call below the threshold returns before anything else happens.
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        let site = self.resolver.resolve(Location::caller());
        self.submit(level, site, message.to_string());
    }

    /// Log pre-formatted arguments at `level`, attributed to the caller
    #[track_caller]
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.log(level, args);
    }

    /// Log with an explicit source location
    pub fn log_at(&self, level: LogLevel, site: CallSite, message: impl fmt::Display) {
        if !self.enabled(level) {
            return;
        }
        self.submit(level, site, message.to_string());
    }

    fn submit(&self, level: LogLevel, site: CallSite, message: String) {
        let line = LogEntry::new(level, site, message).render(&self.timestamp_format);
        match self.enqueue(Message::Line(line)) {
            Ok(()) => {
                self.metrics.record_enqueued();
            }
            Err(_) => {
                self.metrics.record_dropped();
            }
        }
    }

    /// Blocks while the queue is full
    fn enqueue(&self, message: Message) -> Result<()> {
        // clone out so shutdown never waits on a blocked producer
        let sender = self.sender.read().clone();
        match sender {
            Some(sender) => sender.send(message).map_err(|_| LoggerError::LoggerStopped),
            None => Err(LoggerError::LoggerStopped),
        }
    }

    /// Write out everything logged so far.
    ///
    /// Lines enqueued before this call are written first, then the buffer
    /// is drained into the sinks.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the write or flush fails
    pub fn flush(&self) -> Result<()> {
        let (reply, outcome) = bounded(1);
        match self.enqueue(Message::Flush(reply)) {
            Ok(()) => outcome.recv().map_err(|_| LoggerError::LoggerStopped)?,
            // worker is gone, nothing else touches the buffer now
            Err(LoggerError::LoggerStopped) => self.sink.lock().flush(),
            Err(e) => Err(e),
        }
    }

    /// Send subsequent output to a no-op sink until [`resume_output`](Self::resume_output).
    ///
    /// Takes effect in queue order: lines logged before this call are still
    /// written. Repeated calls do not nest.
    pub fn discard_output(&self) {
        if self.enqueue(Message::Discard).is_err() && self.sink.lock().discard().is_err() {
            self.metrics.record_flush_failure();
        }
    }

    /// Restore the sink set aside by [`discard_output`](Self::discard_output).
    pub fn resume_output(&self) {
        if self.enqueue(Message::Resume).is_err() {
            self.sink.lock().resume();
        }
    }

    /// Handle onto the buffered sink, bypassing the level gate and the queue
    pub fn raw_writer(&self) -> RawWriter {
        RawWriter::new(Arc::clone(&self.sink))
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Whether the worker still accepts lines
    pub fn is_running(&self) -> bool {
        self.sender.read().is_some()
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    #[track_caller]
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /// Log at `Fatal`, flush, then run the fatal hook (exits by default)
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(LogLevel::Fatal, message);
        self.terminate();
    }

    /// Formatted [`fatal`](Self::fatal)
    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Fatal, args);
        self.terminate();
    }

    fn terminate(&self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before fatal exit: {}", e);
        }
        (self.on_fatal)(FATAL_EXIT_CODE);
    }

    /// Gracefully shutdown the logger with a custom timeout
    ///
    /// Closes the queue, lets the worker write and flush every pending line,
    /// and waits for it to finish. Later log calls are dropped.
    ///
    /// # Returns
    ///
    /// `true` if shutdown completed successfully within timeout, `false` otherwise
    pub fn shutdown(&self, timeout: Duration) -> bool {
        // Close the channel to signal worker thread
        drop(self.sender.write().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = std::time::Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Log worker thread panicked during shutdown: {:?}", e);
                    // worker died mid-loop, salvage what is buffered
                    return self.sink.lock().flush().is_ok();
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Log worker thread did not finish within {:?}. \
                     Some logs may be lost.",
                    timeout
                );
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let dropped = self.metrics.lines_dropped();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shut down after dropping {} lines logged too late",
                dropped
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_buffered_logger::prelude::*;
/// use rust_buffered_logger::sinks::MemorySink;
/// use std::time::Duration;
///
/// let out = MemorySink::new();
/// let logger = Logger::builder()
///     .level_name("info")
///     .no_file()
///     .sink(out.clone())
///     .flush_interval(Duration::from_millis(200))
///     .build()
///     .unwrap();
///
/// logger.debug("filtered");
/// logger.error("kept");
/// logger.flush().unwrap();
/// assert_eq!(out.lines().len(), 1);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    sinks: Vec<Sink>,
    resolver: Arc<dyn CallSiteResolver>,
    on_fatal: FatalHook,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            sinks: Vec::new(),
            resolver: Arc::new(BasenameResolver),
            on_fatal: exit_process(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the level by name; unknown names fall back to `Debug`
    #[must_use = "builder methods return a new value"]
    pub fn level_name(mut self, name: &str) -> Self {
        self.config.level = LogLevel::from_name_or_default(name);
        self
    }

    /// Rotating log file path (default `./log.log`)
    #[must_use = "builder methods return a new value"]
    pub fn filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.filename = Some(path.into());
        self
    }

    /// Do not open a log file; only the added sinks receive output
    #[must_use = "builder methods return a new value"]
    pub fn no_file(mut self) -> Self {
        self.config.filename = None;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_size_mb(mut self, megabytes: u64) -> Self {
        self.config.max_size_mb = megabytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_age_days(mut self, days: u64) -> Self {
        self.config.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_backups(mut self, count: usize) -> Self {
        self.config.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn local_time(mut self, local_time: bool) -> Self {
        self.config.local_time = local_time;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.config.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Quiet period before buffered output is flushed (millisecond resolution)
    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval_ms = interval.as_millis().max(1) as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp = format;
        self
    }

    /// Duplicate output to an additional sink
    #[must_use = "builder methods return a new value"]
    pub fn sink<W: Write + Send + 'static>(mut self, sink: W) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sinks<I: IntoIterator<Item = Sink>>(mut self, sinks: I) -> Self {
        self.sinks.extend(sinks);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn resolver<R: CallSiteResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Replace the process exit that follows a fatal line
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal(mut self, hook: FatalHook) -> Self {
        self.on_fatal = hook;
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Open the sinks and start the worker
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, no sink is configured,
    /// the log file cannot be opened or a thread cannot be spawned
    pub fn build(self) -> Result<Logger> {
        let config = self.config;
        config.validate()?;

        let mut sinks = self.sinks;
        if let Some(path) = &config.filename {
            sinks.push(Box::new(RotatingFile::with_policy(path, config.rotation_policy())?));
        }
        if sinks.is_empty() {
            return Err(LoggerError::config(
                "sinks",
                "no log file and no additional sink configured",
            ));
        }

        let composite = MultiSink::new(sinks).into_sink();
        let sink = Arc::new(Mutex::new(BufferedSink::with_capacity(
            config.buffer_capacity,
            composite,
        )));
        let metrics = Arc::new(LoggerMetrics::new());

        let timer_sink = Arc::clone(&sink);
        let timer_metrics = Arc::clone(&metrics);
        let debouncer = Debouncer::new(config.flush_interval(), move || {
            worker::debounced_flush(&timer_sink, &timer_metrics)
        })?;

        let (sender, receiver) = bounded(config.queue_capacity);
        let worker_sink = Arc::clone(&sink);
        let worker_metrics = Arc::clone(&metrics);
        let handle = thread::Builder::new()
            .name("log-worker".into())
            .spawn(move || worker::run(receiver, worker_sink, debouncer, worker_metrics))
            .map_err(|e| LoggerError::io_operation("starting log worker", "spawn failed", e))?;

        Ok(Logger {
            threshold: config.level,
            timestamp_format: config.timestamp,
            resolver: self.resolver,
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            sink,
            metrics,
            on_fatal: self.on_fatal,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
