//! Sinks and the builders that construct them.
//!
//! A [`Sink`] binds one encoder, one writer and one minimum severity. A
//! [`SinkBuilder`] holds only its options; every call to
//! [`SinkBuilder::build`] derives a fresh [`Config`] from the defaults, so
//! no two sinks share configuration.

use std::path::PathBuf;

use parking_lot::Mutex;

use crate::config::{Config, LevelFormat, TimeFormat};
use crate::encoder::{ConsoleEncoder, Encoder, JsonEncoder};
use crate::entry::Entry;
use crate::error::LogResult;
use crate::level::Level;
use crate::options::{derive, ConfigOption};
use crate::writer::{MemoryWriter, RollingFile, Writer};

/// One encoder + writer + severity filter.
#[derive(Debug)]
pub struct Sink {
    level: Level,
    encoder: Encoder,
    writer: Mutex<Writer>,
}

impl Sink {
    pub fn new(level: Level, encoder: Encoder, writer: Writer) -> Self {
        Self {
            level,
            encoder,
            writer: Mutex::new(writer),
        }
    }

    /// Minimum severity this sink accepts.
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// Encode `entry` and append it, if the sink accepts its severity.
    ///
    /// Encoding happens before the writer lock is taken; the append itself
    /// is serialized so records from concurrent callers never interleave.
    pub fn write(&self, entry: &Entry) -> LogResult<()> {
        if !self.enabled(entry.level) {
            return Ok(());
        }
        let bytes = self.encoder.encode(entry)?;
        self.writer.lock().write_all(&bytes)?;
        Ok(())
    }

    pub fn flush(&self) -> LogResult<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        let _ = self.writer.get_mut().flush();
    }
}

/// Where a console sink writes.
#[derive(Debug, Clone, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
    /// Capture into a shared buffer
    Memory(MemoryWriter),
}

impl ConsoleTarget {
    fn writer(&self) -> Writer {
        match self {
            ConsoleTarget::Stdout => Writer::Stdout,
            ConsoleTarget::Stderr => Writer::Stderr,
            ConsoleTarget::Memory(buf) => Writer::Memory(buf.clone()),
        }
    }
}

/// Recipe for one sink: its kind plus the options applied over the defaults.
#[derive(Debug, Clone)]
pub enum SinkBuilder {
    /// JSON lines into a rolling file
    File { options: Vec<ConfigOption> },
    /// Colored human-readable lines on a console stream
    Console {
        options: Vec<ConfigOption>,
        target: ConsoleTarget,
    },
}

impl SinkBuilder {
    /// The configuration this builder's sink would use.
    ///
    /// User options are applied first, then the sink kind's fixed formats:
    /// file sinks always use `YYYY-MM-DD HH:MM:SS.mmm` timestamps, console
    /// sinks always color level and time. Options cannot change these.
    pub fn config(&self) -> Config {
        match self {
            SinkBuilder::File { options } => {
                let mut cfg = derive(&Config::default(), options);
                cfg.encoder.time_format = TimeFormat::Millis;
                cfg
            }
            SinkBuilder::Console { options, .. } => {
                let mut cfg = derive(&Config::default(), options);
                cfg.encoder.level_format = LevelFormat::Color;
                cfg.encoder.time_format = TimeFormat::Color;
                cfg
            }
        }
    }

    /// The destination of a file builder, if it has a non-empty one.
    pub fn file_path(&self) -> Option<PathBuf> {
        match self {
            SinkBuilder::File { .. } => {
                let path = self.config().file_path;
                (!path.as_os_str().is_empty()).then_some(path)
            }
            SinkBuilder::Console { .. } => None,
        }
    }

    /// Construct the sink. A file builder with an empty path yields `None`.
    ///
    /// No I/O happens here; the file and its directory are created on the
    /// first write. Every call opens its own writer, so two sinks built for
    /// the same file path would rotate the file under each other;
    /// [`crate::TeeLogger::build`] rejects that. Console sinks on the same
    /// stream or memory buffer are safe to combine: each record is appended
    /// whole under the stream's or buffer's own lock.
    pub fn build(&self) -> Option<Sink> {
        let cfg = self.config();
        match self {
            SinkBuilder::File { .. } => {
                if cfg.file_path.as_os_str().is_empty() {
                    return None;
                }
                let writer = RollingFile::new(&cfg.file_path, &cfg.rotation);
                Some(Sink::new(
                    cfg.level,
                    Encoder::Json(JsonEncoder::new(cfg.encoder)),
                    Writer::Rolling(writer),
                ))
            }
            SinkBuilder::Console { target, .. } => Some(Sink::new(
                cfg.level,
                Encoder::Console(ConsoleEncoder::new(cfg.encoder)),
                target.writer(),
            )),
        }
    }
}

/// A file sink builder.
pub fn file_sink(options: impl IntoIterator<Item = ConfigOption>) -> SinkBuilder {
    SinkBuilder::File {
        options: options.into_iter().collect(),
    }
}

/// A console sink builder writing to stdout.
pub fn console_sink(options: impl IntoIterator<Item = ConfigOption>) -> SinkBuilder {
    console_sink_to(ConsoleTarget::Stdout, options)
}

/// A console sink builder writing to `target`.
pub fn console_sink_to(
    target: ConsoleTarget,
    options: impl IntoIterator<Item = ConfigOption>,
) -> SinkBuilder {
    SinkBuilder::Console {
        options: options.into_iter().collect(),
        target,
    }
}
