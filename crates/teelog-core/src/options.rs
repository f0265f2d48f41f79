//! Ordered configuration options.
//!
//! Options are applied left to right over a fresh copy of the defaults, so
//! the last option touching a field wins. The defaults are never mutated.

use std::path::PathBuf;

use crate::config::{Config, EncoderConfig};
use crate::level::Level;

/// One field-overwriting transformation of a [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOption {
    Level(Level),
    FilePath(PathBuf),
    Encoder(EncoderConfig),
    Rotation {
        max_size_mb: u64,
        max_age_days: u32,
        compress: bool,
    },
    MaxBackups(usize),
}

impl ConfigOption {
    /// Overwrite the fields this option controls.
    pub fn apply(&self, cfg: &mut Config) {
        match self {
            ConfigOption::Level(level) => cfg.level = *level,
            ConfigOption::FilePath(path) => cfg.file_path = path.clone(),
            ConfigOption::Encoder(encoder) => cfg.encoder = encoder.clone(),
            ConfigOption::Rotation {
                max_size_mb,
                max_age_days,
                compress,
            } => {
                cfg.rotation.max_size_mb = *max_size_mb;
                cfg.rotation.max_age_days = *max_age_days;
                cfg.rotation.compress = *compress;
            }
            ConfigOption::MaxBackups(count) => cfg.rotation.max_backups = *count,
        }
    }
}

/// Set the minimum severity.
pub fn with_level(level: Level) -> ConfigOption {
    ConfigOption::Level(level)
}

/// Set the file sink's destination.
pub fn with_file_path(path: impl Into<PathBuf>) -> ConfigOption {
    ConfigOption::FilePath(path.into())
}

/// Replace the whole encoder configuration (keys and formats).
pub fn with_format(encoder: EncoderConfig) -> ConfigOption {
    ConfigOption::Encoder(encoder)
}

/// Set max size (MB), max age (days) and compression. Backup count is left alone.
pub fn with_rotate_settings(max_size_mb: u64, max_age_days: u32, compress: bool) -> ConfigOption {
    ConfigOption::Rotation {
        max_size_mb,
        max_age_days,
        compress,
    }
}

/// Set the number of rotated backups to keep.
pub fn with_max_backups(count: usize) -> ConfigOption {
    ConfigOption::MaxBackups(count)
}

/// Apply `options` in order over a copy of `defaults`.
pub fn derive(defaults: &Config, options: &[ConfigOption]) -> Config {
    let mut cfg = defaults.clone();
    for option in options {
        option.apply(&mut cfg);
    }
    cfg
}
