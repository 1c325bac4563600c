//! Byte sinks the buffered output is flushed into

#[cfg(feature = "console")]
pub mod console;
pub mod memory;
pub mod multi;
pub mod rotating_file;

#[cfg(feature = "console")]
pub use console::ConsoleSink;
pub use memory::MemorySink;
pub use multi::MultiSink;
pub use rotating_file::{RotatingFile, RotationPolicy};

pub use crate::core::buffered_sink::Sink;
