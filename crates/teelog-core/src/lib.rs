//! # teelog-core
//!
//! Multi-sink structured logging.
//!
//! A logger is assembled from [`SinkBuilder`]s. Each builder derives its own
//! [`Config`] by applying [`ConfigOption`]s over the defaults, then builds one
//! [`Sink`]: an encoder, a writer and a minimum severity. The sinks are
//! combined into a [`Tee`] that delivers every record to each sink admitting
//! its severity. A [`LoggerCell`] holds the current [`Handle`] and flushes it
//! when a new one is installed.
//!
//! ```no_run
//! use teelog_core::{console_sink, file_sink, with_file_path, with_level, Level, LoggerCell};
//!
//! let cell = LoggerCell::new();
//! let log = cell.build_logger([
//!     file_sink([with_file_path("logs/app.log"), with_level(Level::Info)]),
//!     console_sink([with_level(Level::Debug)]),
//! ])?;
//!
//! log.info("service started");
//! log.flush()?;
//! # Ok::<(), teelog_core::LogError>(())
//! ```

pub mod config;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod handle;
pub mod layer;
pub mod level;
pub mod logger;
pub mod options;
pub mod sink;
pub mod tee;
pub mod writer;

pub use config::{CallerFormat, Config, EncoderConfig, LevelFormat, RotationPolicy, TimeFormat};
pub use entry::{Caller, Entry, Field};
pub use error::{LogError, LogResult};
pub use handle::{Handle, LoggerCell};
pub use layer::TeeLayer;
pub use level::Level;
pub use logger::{standard_builders, TeeLogger};
pub use options::{
    derive, with_file_path, with_format, with_level, with_max_backups, with_rotate_settings,
    ConfigOption,
};
pub use sink::{console_sink, console_sink_to, file_sink, ConsoleTarget, Sink, SinkBuilder};
pub use tee::{assemble, Tee};
pub use writer::{MemoryWriter, RollingFile, Writer};
