//! Integration tests for the buffered logger
//!
//! These tests verify:
//! - Level filtering and line format end to end through a log file
//! - Explicit flush error propagation
//! - Discard/resume of output, including a failing sink
//! - Fatal handling
//! - Duplication to several sinks without repeats after a failure
//! - File rotation driven by the logger
//! - JSON configuration

use rust_buffered_logger::prelude::*;
use rust_buffered_logger::sinks::MemorySink;
use rust_buffered_logger::{CallSite, FullPathResolver};
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while !condition() {
        if start.elapsed() > timeout {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    true
}

#[test]
fn test_file_logging_filters_and_formats() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let logger = Logger::builder()
        .level(LogLevel::Info)
        .filename(&log_file)
        .build()
        .expect("Failed to build logger");

    logger.debug("below threshold");
    let line = line!() + 1;
    logger.error("disk almost full");
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(
        content,
        format!("[Error] integration_tests.rs:{}: disk almost full\n", line)
    );
}

#[test]
fn test_quiet_period_reaches_file_without_flush() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("debounced.log");

    let logger = Logger::builder()
        .filename(&log_file)
        .flush_interval(Duration::from_millis(50))
        .build()
        .expect("Failed to build logger");

    logger.info("eventually on disk");

    let written = wait_until(Duration::from_secs(5), || {
        fs::read_to_string(&log_file)
            .map(|c| c.ends_with("eventually on disk\n"))
            .unwrap_or(false)
    });
    assert!(written, "debounced flush never reached the file");
    assert!(logger.metrics().debounced_flushes() >= 1);
}

#[test]
fn test_lines_stay_buffered_until_flush() {
    let out = MemorySink::new();
    let logger = Logger::builder()
        .no_file()
        .sink(out.clone())
        .flush_interval(Duration::from_secs(60))
        .build()
        .expect("Failed to build logger");

    logger.info("held back");
    assert!(wait_until(Duration::from_secs(5), || logger.metrics().lines_written() == 1));
    assert!(out.is_empty());

    logger.flush().expect("Failed to flush");
    assert_eq!(out.lines().len(), 1);
}

/// Writer that fails while `broken` is set
struct Unplugged {
    out: MemorySink,
    broken: Arc<AtomicBool>,
}

impl Write for Unplugged {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
        }
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_flush_error_is_returned_and_recoverable() {
    let out = MemorySink::new();
    let broken = Arc::new(AtomicBool::new(true));
    let logger = Logger::builder()
        .no_file()
        .sink(Unplugged {
            out: out.clone(),
            broken: Arc::clone(&broken),
        })
        .build()
        .expect("Failed to build logger");

    logger.warn("queued while broken");
    let err = logger.flush().expect_err("flush should fail");
    assert!(matches!(err, LoggerError::IoOperation { .. } | LoggerError::IoError(_)));

    broken.store(false, Ordering::SeqCst);
    logger.flush().expect("flush should recover");
    assert!(out.contents().ends_with("queued while broken\n"));
}

#[test]
fn test_discard_and_resume() {
    let out = MemorySink::new();
    let logger = Logger::builder()
        .no_file()
        .sink(out.clone())
        .build()
        .expect("Failed to build logger");

    logger.info("before");
    logger.discard_output();
    logger.discard_output();
    for i in 0..20 {
        logger.infof(format_args!("muted {}", i));
    }
    logger.resume_output();
    logger.info("after");
    logger.flush().expect("Failed to flush");

    let lines = out.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("before"));
    assert!(lines[1].ends_with("after"));
    assert!(!out.contents().contains("muted"));
}

#[test]
fn test_discard_keeps_lines_its_flush_could_not_write() {
    let out = MemorySink::new();
    let broken = Arc::new(AtomicBool::new(true));
    let logger = Logger::builder()
        .no_file()
        .sink(Unplugged {
            out: out.clone(),
            broken: Arc::clone(&broken),
        })
        .build()
        .expect("Failed to build logger");

    logger.info("logged before discard");
    logger.discard_output();
    assert!(wait_until(Duration::from_secs(5), || {
        logger.metrics().flush_failures() >= 1
    }));
    logger.info("muted");

    broken.store(false, Ordering::SeqCst);
    logger.resume_output();
    logger.flush().expect("Failed to flush");

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("logged before discard"));
}

#[test]
fn test_discard_then_resume_is_invisible() {
    let plain = MemorySink::new();
    let toggled = MemorySink::new();
    let build = |out: &MemorySink| {
        Logger::builder()
            .level(LogLevel::Trace)
            .no_file()
            .sink(out.clone())
            .buffer_capacity(256)
            .build()
            .expect("Failed to build logger")
    };
    let first = build(&plain);
    let second = build(&toggled);
    let site = CallSite::new("worker.rs", 12);

    for i in 0..40 {
        let message = format!("job {} finished", i);
        first.log_at(LogLevel::Info, site.clone(), &message);
        second.log_at(LogLevel::Info, site.clone(), &message);
        if i == 20 {
            second.discard_output();
            second.resume_output();
        }
    }
    first.flush().expect("Failed to flush");
    second.flush().expect("Failed to flush");

    assert_eq!(plain.lines().len(), 40);
    assert_eq!(plain.contents(), toggled.contents());
}

#[test]
fn test_failing_sink_does_not_duplicate_lines_elsewhere() {
    let healthy = MemorySink::new();
    let flaky = MemorySink::new();
    let broken = Arc::new(AtomicBool::new(true));
    let logger = Logger::builder()
        .no_file()
        .sink(healthy.clone())
        .sink(Unplugged {
            out: flaky.clone(),
            broken: Arc::clone(&broken),
        })
        .build()
        .expect("Failed to build logger");

    logger.warn("written once");
    assert!(logger.flush().is_err());

    broken.store(false, Ordering::SeqCst);
    logger.flush().expect("flush should recover");
    logger.flush().expect("Failed to flush");

    assert_eq!(healthy.lines().len(), 1);
    assert_eq!(flaky.lines().len(), 1);
    assert_eq!(healthy.contents(), flaky.contents());
}

#[test]
fn test_fatal_writes_line_before_hook() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("fatal.log");
    let status = Arc::new(AtomicI32::new(-1));
    let status_clone = Arc::clone(&status);
    let path = log_file.clone();
    let seen_on_disk = Arc::new(AtomicBool::new(false));
    let seen_clone = Arc::clone(&seen_on_disk);

    let logger = Logger::builder()
        .level(LogLevel::Error)
        .filename(&log_file)
        .on_fatal(Arc::new(move |code| {
            let content = fs::read_to_string(&path).unwrap_or_default();
            seen_clone.store(content.contains("out of memory"), Ordering::SeqCst);
            status_clone.store(code, Ordering::SeqCst);
        }))
        .build()
        .expect("Failed to build logger");

    logger.fatal("out of memory");

    assert!(seen_on_disk.load(Ordering::SeqCst));
    assert_eq!(status.load(Ordering::SeqCst), 1);
}

#[test]
fn test_output_duplicated_to_every_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("dup.log");
    let first = MemorySink::new();
    let second = MemorySink::new();

    let logger = Logger::builder()
        .filename(&log_file)
        .sink(first.clone())
        .sink(second.clone())
        .build()
        .expect("Failed to build logger");

    logger.info("everywhere");
    logger.flush().expect("Failed to flush");

    let file_content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(first.contents(), file_content);
    assert_eq!(second.contents(), file_content);
    assert!(file_content.ends_with("everywhere\n"));
}

#[test]
fn test_rotation_through_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");

    let logger = Logger::builder()
        .level(LogLevel::Trace)
        .filename(&log_file)
        .max_size_mb(1)
        .max_backups(2)
        .build()
        .expect("Failed to build logger");

    let payload = "x".repeat(1000);
    for i in 0..2500 {
        logger.tracef(format_args!("{} {}", i, payload));
    }
    logger.flush().expect("Failed to flush");
    assert!(logger.shutdown(Duration::from_secs(5)));

    let files: Vec<_> = fs::read_dir(temp_dir.path())
        .expect("Failed to list dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let backups = files.iter().filter(|n| n.starts_with("rotating-")).count();
    assert_eq!(backups, 2, "files: {:?}", files);

    let active = fs::metadata(&log_file).expect("active file missing").len();
    assert!(active <= 1024 * 1024);

    // the newest line is in the active file
    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert!(content.lines().last().is_some_and(|l| l.contains("2499 ")));
}

#[test]
fn test_full_path_resolver_and_explicit_site() {
    let out = MemorySink::new();
    let logger = Logger::builder()
        .no_file()
        .sink(out.clone())
        .resolver(FullPathResolver)
        .build()
        .expect("Failed to build logger");

    logger.info("with path");
    logger.log_at(LogLevel::Warn, CallSite::new("plugin/loader.rs", 88), "forwarded");
    logger.flush().expect("Failed to flush");

    let lines = out.lines();
    assert!(lines[0].contains("tests"));
    assert!(lines[0].contains("integration_tests.rs:"));
    assert_eq!(lines[1], "[ Warn] plugin/loader.rs:88: forwarded");
}

#[test]
fn test_raw_writer_shares_buffer_order() {
    let out = MemorySink::new();
    let logger = Logger::builder()
        .no_file()
        .sink(out.clone())
        .build()
        .expect("Failed to build logger");

    logger.info("first");
    logger.flush().expect("Failed to flush");

    let mut raw = logger.raw_writer();
    writeln!(raw, "--- banner ---").expect("raw write failed");
    logger.info("second");
    logger.flush().expect("Failed to flush");

    let lines = out.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "--- banner ---");
    assert!(lines[2].ends_with("second"));
}

#[test]
fn test_logger_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("configured.log");
    let json = format!(
        r#"{{ "level": "WARN", "filename": {:?}, "timestamp": "standard" }}"#,
        log_file.to_str().expect("utf-8 temp path")
    );

    let config = LoggerConfig::from_json_str(&json).expect("Failed to parse config");
    let logger = Logger::new(config).expect("Failed to build logger");
    assert_eq!(logger.threshold(), LogLevel::Warn);

    logger.info("skipped");
    logger.warn("kept");
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains(" [ Warn] integration_tests.rs:"));
}

#[test]
fn test_drop_flushes_pending_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("drop.log");

    {
        let logger = Logger::builder()
            .filename(&log_file)
            .flush_interval(Duration::from_secs(60))
            .build()
            .expect("Failed to build logger");
        for i in 0..30 {
            logger.debug(i);
        }
    }

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 30);
}
