//! Console sink

use crate::core::LogLevel;
use colored::Colorize;
use std::io::{self, Write};

/// Mirrors rendered lines to the terminal.
///
/// `Error` and `Fatal` lines go to stderr, everything else to stdout. With
/// colors enabled each line is tinted by the level found in its tag.
pub struct ConsoleSink {
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn emit_line(&self, line: &str) -> io::Result<()> {
        let level = LogLevel::from_line_tag(line);
        let text = match level {
            Some(level) if self.use_colors => line.color(level.color_code()).to_string(),
            _ => line.to_string(),
        };

        match level {
            Some(LogLevel::Error | LogLevel::Fatal) => writeln!(io::stderr().lock(), "{}", text),
            _ => writeln!(io::stdout().lock(), "{}", text),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for ConsoleSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let mut rest: &str = &text;

        while let Some(end) = rest.find('\n') {
            self.emit_line(&rest[..end])?;
            rest = &rest[end + 1..];
        }
        if !rest.is_empty() {
            // unterminated tail from a raw write
            io::stdout().lock().write_all(rest.as_bytes())?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Flush both stdout and stderr since we write to both
        io::stdout().flush()?;
        io::stderr().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_accepts_whole_buffer() {
        let mut sink = ConsoleSink::with_colors(false);
        let chunk = b"[ Info] main.rs:1: started\n[Error] main.rs:2: failed\n";
        assert_eq!(sink.write(chunk).unwrap(), chunk.len());
        sink.flush().unwrap();
    }

    #[test]
    fn test_console_handles_untagged_text() {
        let mut sink = ConsoleSink::new();
        assert_eq!(sink.write(b"partial").unwrap(), 7);
    }
}
