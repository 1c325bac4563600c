//! Composite sink duplicating every write to several destinations

use crate::core::buffered_sink::{Sink, DEFAULT_BUFFER_CAPACITY};
use std::io::{self, Write};

/// Most bytes held back for one lagging sink
pub const MAX_BACKLOG: usize = 4 * DEFAULT_BUFFER_CAPACITY;

/// Fans each write out to all inner sinks, in order.
///
/// Progress is tracked per sink. When one sink fails, the bytes it did not
/// take are held in its own backlog and retried on the next write or flush,
/// so the sinks that succeeded never see the same bytes twice. A write a sink
/// rejects as `InvalidInput` is not retried for that sink. A write fails only
/// when no sink took any of it. `flush` reports an error while any backlog is
/// left.
pub struct MultiSink {
    lanes: Vec<Lane>,
}

struct Lane {
    sink: Sink,
    backlog: Vec<u8>,
}

impl Lane {
    /// Retry the backlog, failing while any of it is left.
    fn catch_up(&mut self) -> io::Result<()> {
        let (written, failure) = write_some(&mut self.sink, &self.backlog);
        self.backlog.drain(..written);
        failure.map_or(Ok(()), Err)
    }

    fn hold(&mut self, bytes: &[u8]) {
        if self.backlog.len() + bytes.len() > MAX_BACKLOG {
            eprintln!(
                "[LOGGER WARNING] Sink backlog full, dropping {} bytes",
                bytes.len()
            );
            return;
        }
        self.backlog.extend_from_slice(bytes);
    }
}

/// Write as much of `bytes` as the sink takes before failing.
fn write_some(sink: &mut Sink, bytes: &[u8]) -> (usize, Option<io::Error>) {
    let mut written = 0;
    while written < bytes.len() {
        match sink.write(&bytes[written..]) {
            Ok(0) => {
                let e = io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes");
                return (written, Some(e));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (written, Some(e)),
        }
    }
    (written, None)
}

impl MultiSink {
    pub fn new(sinks: Vec<Sink>) -> Self {
        let lanes = sinks
            .into_iter()
            .map(|sink| Lane {
                sink,
                backlog: Vec::new(),
            })
            .collect();
        Self { lanes }
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Bytes held back across all sinks
    pub fn backlog(&self) -> usize {
        self.lanes.iter().map(|lane| lane.backlog.len()).sum()
    }

    /// Collapse to the single sink when there is only one.
    pub fn into_sink(mut self) -> Sink {
        if self.lanes.len() == 1 {
            if let Some(only) = self.lanes.pop() {
                return only.sink;
            }
        }
        Box::new(self)
    }
}

impl Write for MultiSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut refused = Vec::new();
        let mut rejected = Vec::new();
        let mut first_error = None;

        for (index, lane) in self.lanes.iter_mut().enumerate() {
            if !lane.backlog.is_empty() {
                if let Err(e) = lane.catch_up() {
                    first_error.get_or_insert(e);
                }
            }
            if !lane.backlog.is_empty() {
                // keep byte order behind what is already held
                lane.hold(buf);
                continue;
            }
            match write_some(&mut lane.sink, buf) {
                (_, None) => {}
                // retrying cannot help
                (0, Some(e)) if e.kind() == io::ErrorKind::InvalidInput => {
                    first_error.get_or_insert(e);
                    rejected.push(index);
                }
                (0, Some(e)) => {
                    first_error.get_or_insert(e);
                    refused.push(index);
                }
                (written, Some(e)) => {
                    first_error.get_or_insert(e);
                    lane.hold(&buf[written..]);
                }
            }
        }

        if !buf.is_empty() && refused.len() + rejected.len() == self.lanes.len() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }
        for index in refused {
            self.lanes[index].hold(buf);
        }
        for index in rejected {
            eprintln!(
                "[LOGGER WARNING] Sink {} rejected a {} byte write",
                index,
                buf.len()
            );
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut first_error = None;
        for lane in &mut self.lanes {
            if let Err(e) = lane.catch_up() {
                first_error.get_or_insert(e);
                continue;
            }
            if let Err(e) = lane.sink.flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
