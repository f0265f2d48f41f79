//! Sink configuration values.
//!
//! A [`Config`] is never shared between sinks: every builder derives its own
//! copy from [`Config::default`] and its option list (see [`crate::options`]).

use std::borrow::Cow;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::entry::Caller;
use crate::level::Level;

/// Default destination of the file sink.
pub const DEFAULT_LOG_PATH: &str = "logs/teelog.log";

/// `YYYY-MM-DD HH:MM:SS.mmm`, the layout file and console sinks force.
pub const MILLIS_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const ISO8601_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Complete configuration of one sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum severity the sink admits
    pub level: Level,
    /// Destination for the file sink; ignored by the console sink
    pub file_path: PathBuf,
    pub rotation: RotationPolicy,
    pub encoder: EncoderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: Level::Info,
            file_path: PathBuf::from(DEFAULT_LOG_PATH),
            rotation: RotationPolicy::default(),
            encoder: EncoderConfig::default(),
        }
    }
}

/// Size/age/count bounds for the rolling file writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    /// Rotate once the file would exceed this many megabytes (0 = 100 MB)
    pub max_size_mb: u64,
    /// Remove backups older than this many days (0 = keep regardless of age)
    pub max_age_days: u32,
    /// Keep at most this many backups (0 = keep all)
    pub max_backups: usize,
    /// Compress rotated backups with zstd
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_mb: 20,
            max_age_days: 30,
            max_backups: 50,
            compress: false,
        }
    }
}

/// Key names and element formats used by the encoders.
///
/// An empty key omits that element from every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub level_key: String,
    pub time_key: String,
    pub message_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub level_format: LevelFormat,
    pub time_format: TimeFormat,
    pub caller_format: CallerFormat,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            level_key: "level".to_string(),
            time_key: "time".to_string(),
            message_key: "msg".to_string(),
            caller_key: "caller".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: "\n".to_string(),
            level_format: LevelFormat::Lowercase,
            time_format: TimeFormat::Iso8601,
            caller_format: CallerFormat::Short,
        }
    }
}

/// How severities are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelFormat {
    /// `info`
    #[default]
    Lowercase,
    /// `INFO`
    Capital,
    /// `INFO` wrapped in the level's ANSI color
    Color,
}

impl LevelFormat {
    pub fn format(&self, level: Level) -> Cow<'static, str> {
        match self {
            LevelFormat::Lowercase => Cow::Borrowed(level.as_str()),
            LevelFormat::Capital => Cow::Borrowed(level.as_capital_str()),
            LevelFormat::Color => Cow::Owned(level.colored_label()),
        }
    }
}

/// How timestamps are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `2026-10-16T09:30:00.123+0200`
    #[default]
    Iso8601,
    /// `2026-10-16 09:30:00.123`
    Millis,
    /// [`TimeFormat::Millis`] in cyan
    Color,
}

impl TimeFormat {
    pub fn format(&self, time: &DateTime<Local>) -> String {
        match self {
            TimeFormat::Iso8601 => time.format(ISO8601_LAYOUT).to_string(),
            TimeFormat::Millis => time.format(MILLIS_LAYOUT).to_string(),
            TimeFormat::Color => format!("{}{}{}", CYAN, time.format(MILLIS_LAYOUT), RESET),
        }
    }
}

/// How call sites are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerFormat {
    /// Last directory and file name: `src/main.rs:42`
    #[default]
    Short,
    /// Path as recorded by the compiler
    Full,
}

impl CallerFormat {
    pub fn format(&self, caller: &Caller) -> String {
        match self {
            CallerFormat::Short => caller.short(),
            CallerFormat::Full => caller.full(),
        }
    }
}
