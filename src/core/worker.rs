//! Background log loop
//!
//! One worker thread per logger drains the queue into the buffered sink.
//! Lines are written in queue order. Before every receive the debounce timer
//! is poked, so buffered output reaches the sink one quiet interval after
//! the last message.

use super::buffered_sink::BufferedSink;
use super::debounce::Debouncer;
use super::error::Result;
use super::metrics::LoggerMetrics;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

/// Queue item
pub(crate) enum Message {
    /// A fully rendered line
    Line(String),
    /// Drain the buffer and report the outcome
    Flush(Sender<Result<()>>),
    /// Start routing output to a no-op sink
    Discard,
    /// Restore the sink saved by `Discard`
    Resume,
}

/// Run the loop until every sender is gone, then flush what is left.
pub(crate) fn run(
    receiver: Receiver<Message>,
    sink: Arc<Mutex<BufferedSink>>,
    debouncer: Debouncer,
    metrics: Arc<LoggerMetrics>,
) {
    loop {
        debouncer.poke();

        let message = match receiver.recv() {
            Ok(message) => message,
            Err(_) => break,
        };

        match message {
            Message::Line(line) => write_line(&sink, &metrics, &line),
            Message::Flush(reply) => {
                metrics.record_explicit_flush();
                let result = sink.lock().flush();
                // caller may have given up waiting
                let _ = reply.send(result);
            }
            Message::Discard => {
                if sink.lock().discard().is_err() {
                    metrics.record_flush_failure();
                }
            }
            Message::Resume => sink.lock().resume(),
        }
    }

    // stop the timer before the last flush so the two cannot interleave
    drop(debouncer);
    if sink.lock().flush().is_err() {
        metrics.record_flush_failure();
    }
}

fn write_line(sink: &Mutex<BufferedSink>, metrics: &LoggerMetrics, line: &str) {
    let mut sink = sink.lock();

    if line.len() > sink.available() {
        metrics.record_pressure_flush();
        if sink.flush().is_err() {
            metrics.record_flush_failure();
        }
    }

    if sink.write(line.as_bytes()).is_err() {
        metrics.record_flush_failure();
    }
    metrics.record_written();
}

/// Flush callback for the debounce timer. Errors are counted, not reported.
pub(crate) fn debounced_flush(sink: &Mutex<BufferedSink>, metrics: &LoggerMetrics) {
    let mut sink = sink.lock();
    if sink.buffered() == 0 {
        return;
    }
    metrics.record_debounced_flush();
    if sink.flush().is_err() {
        metrics.record_flush_failure();
    }
}
