//! Byte destinations for sinks.
//!
//! Every writer supports a synchronous flush. Writers are not shared: each
//! sink owns exactly one and serializes access to it.

pub mod memory;
pub mod rolling;

use std::io::{self, Write};

pub use memory::MemoryWriter;
pub use rolling::RollingFile;

/// The closed set of sink destinations.
#[derive(Debug)]
pub enum Writer {
    Stdout,
    Stderr,
    Memory(MemoryWriter),
    Rolling(RollingFile),
}

impl Writer {
    /// Append one encoded record.
    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Writer::Stdout => io::stdout().lock().write_all(buf),
            Writer::Stderr => io::stderr().lock().write_all(buf),
            Writer::Memory(writer) => writer.write_all(buf),
            Writer::Rolling(file) => file.write_all(buf),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Stdout => io::stdout().lock().flush(),
            Writer::Stderr => io::stderr().lock().flush(),
            Writer::Memory(writer) => writer.flush(),
            Writer::Rolling(file) => file.flush(),
        }
    }
}
