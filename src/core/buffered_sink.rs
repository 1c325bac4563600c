//! Fixed-capacity output buffer in front of the composite sink

use super::error::{LoggerError, Result};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::mem;
use std::sync::Arc;

/// Default buffer capacity (64 KiB)
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Byte destination behind the buffer
pub type Sink = Box<dyn Write + Send>;

/// Output buffer in front of a byte sink.
///
/// The buffer never grows past its capacity. Writes that do not fit flush
/// first; a write larger than the whole capacity is passed straight through
/// once the buffer is empty.
pub struct BufferedSink {
    buf: Vec<u8>,
    capacity: usize,
    inner: Sink,
    parked: Option<Parked>,
}

/// Real sink set aside while output is discarded
struct Parked {
    sink: Sink,
    /// Bytes logged before the discard that the real sink has not accepted yet
    pending: Vec<u8>,
}

impl BufferedSink {
    pub fn new(inner: Sink) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, inner)
    }

    pub fn with_capacity(capacity: usize, inner: Sink) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            inner,
            parked: None,
        }
    }

    /// Free space left in the buffer
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Bytes waiting for the next flush
    #[inline]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.available() {
            self.flush()?;
        }
        if bytes.len() > self.capacity {
            return self.inner.write_all(bytes).map_err(|e| {
                LoggerError::io_operation(
                    "writing log output",
                    "oversized write rejected by sink",
                    e,
                )
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Drain the buffer into the sink and flush the sink.
    ///
    /// On failure the bytes the sink did not accept stay buffered.
    pub fn flush(&mut self) -> Result<()> {
        let mut written = 0;
        let mut failure = None;

        while written < self.buf.len() {
            match self.inner.write(&self.buf[written..]) {
                Ok(0) => {
                    failure = Some(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "sink accepted no bytes",
                    ));
                    break;
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        self.buf.drain(..written);

        if let Some(e) = failure {
            return Err(LoggerError::io_operation(
                "flushing log buffer",
                format!("{} bytes left buffered", self.buf.len()),
                e,
            ));
        }

        self.inner
            .flush()
            .map_err(|e| LoggerError::io_operation("flushing log sink", "sink flush failed", e))
    }

    /// Route output to a no-op sink, keeping the real one aside.
    ///
    /// Already-buffered bytes are flushed to the real sink first. If that
    /// flush fails they are kept with the real sink and written after
    /// [`resume`](Self::resume). Calling this while already discarding does
    /// nothing.
    pub fn discard(&mut self) -> Result<()> {
        if self.parked.is_some() {
            return Ok(());
        }
        let flushed = self.flush();
        self.parked = Some(Parked {
            sink: mem::replace(&mut self.inner, Box::new(io::sink())),
            pending: mem::replace(&mut self.buf, Vec::with_capacity(self.capacity)),
        });
        flushed
    }

    /// Restore the sink saved by [`discard`](Self::discard).
    ///
    /// Bytes written while discarding are dropped; bytes the real sink still
    /// owed from before the discard are buffered again for the next flush.
    pub fn resume(&mut self) {
        if let Some(parked) = self.parked.take() {
            self.inner = parked.sink;
            self.buf = parked.pending;
            self.buf.reserve(self.capacity.saturating_sub(self.buf.len()));
        }
    }

    pub fn is_discarding(&self) -> bool {
        self.parked.is_some()
    }
}

impl Drop for BufferedSink {
    fn drop(&mut self) {
        self.resume();
        let _ = self.flush();
    }
}

/// Direct `io::Write` handle onto a logger's buffered sink.
///
/// Bytes written here skip the level gate and the queue, and interleave with
/// queued lines at whatever point the worker happens to be.
#[derive(Clone)]
pub struct RawWriter {
    sink: Arc<Mutex<BufferedSink>>,
}

impl RawWriter {
    pub(crate) fn new(sink: Arc<Mutex<BufferedSink>>) -> Self {
        Self { sink }
    }
}

impl Write for RawWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.lock().write(buf).map_err(LoggerError::into_io)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.lock().flush().map_err(LoggerError::into_io)
    }
}
