//! Basic logger usage example
//!
//! Demonstrates the level methods, their formatting variants and the
//! logging macros, mirrored to the console.
//!
//! Run with: cargo run --example basic_usage

use rust_buffered_logger::prelude::*;
use rust_buffered_logger::sinks::ConsoleSink;
use rust_buffered_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Buffered Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .level(LogLevel::Trace)
        .no_file()
        .sink(ConsoleSink::new())
        .build()?;

    println!("1. Logging at different levels:");
    logger.trace("trace");
    logger.tracef(format_args!("tracef\n"));
    logger.debug("debug");
    logger.debugf(format_args!("debugf {}", 1));
    logger.info("info");
    logger.warn("warn");
    logger.error("error");
    logger.flush()?;

    println!("\n2. Using the macros:");
    let port = 8080;
    info!(logger, "Server listening on port {}", port);
    warn!(logger, "Retry attempt {} of {}", 3, 5);
    logger.flush()?;

    println!("\n3. A logger with a higher threshold:");
    let quiet = Logger::builder()
        .level_name("warn")
        .no_file()
        .sink(ConsoleSink::new())
        .build()?;
    quiet.debug("Debug message (hidden)");
    quiet.info("Info message (hidden)");
    quiet.warn("Warning message (visible)");
    quiet.flush()?;

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
