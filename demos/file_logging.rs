//! File logging example
//!
//! Demonstrates a size-rotated log file duplicated to the console, and
//! muting output for a noisy phase.
//!
//! Run with: cargo run --example file_logging

use rust_buffered_logger::prelude::*;
use rust_buffered_logger::sinks::ConsoleSink;

fn main() -> Result<()> {
    println!("=== Rust Buffered Logger - File Logging Example ===\n");

    let logger = Logger::builder()
        .level(LogLevel::Debug)
        .filename("application.log")
        .max_size_mb(5)
        .max_backups(3)
        .max_age_days(7)
        .compress(true)
        .timestamp(TimestampFormat::Standard)
        .sink(ConsoleSink::new())
        .build()?;

    println!("1. Logging to both console and file:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warn("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Muting a noisy phase:");
    logger.discard_output();
    for i in 1..=1000 {
        logger.debugf(format_args!("Warming cache entry {}", i));
    }
    logger.resume_output();
    logger.info("Cache warm");

    println!("\n3. Writing a raw banner:");
    logger.flush()?;
    let mut raw = logger.raw_writer();
    std::io::Write::write_all(&mut raw, b"==== end of startup ====\n")?;

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");

    Ok(())
}
