//! Default logger example
//!
//! Demonstrates the process-wide logger shared by several threads.
//!
//! Run with: cargo run --example global_logging

use rust_buffered_logger::global;
use rust_buffered_logger::prelude::*;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Buffered Logger - Global Logging Example ===\n");

    global::init(LoggerConfig {
        level: LogLevel::Info,
        filename: Some("global.log".into()),
        ..LoggerConfig::default()
    })?;

    global::info("main thread started");

    let workers: Vec<_> = (0..4)
        .map(|id| {
            thread::spawn(move || {
                for job in 0..25 {
                    global::infof(format_args!("worker {} finished job {}", id, job));
                }
                global::debug("hidden below Info");
            })
        })
        .collect();

    for worker in workers {
        let _ = worker.join();
    }

    global::warn("all workers done");
    global::flush()?;
    global::shutdown();

    println!("Check 'global.log' for 102 lines of output");
    Ok(())
}
