//! Error types for teelog

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for logger construction and flushing
#[derive(Error, Debug)]
pub enum LogError {
    /// `build` was called with an empty builder list
    #[error("Configuration error: at least one sink builder is required")]
    NoBuilders,

    /// Every builder slot was absent or produced no sink
    #[error("Configuration error: no valid log sinks were configured")]
    NoValidSinks,

    /// Two file sinks were configured with the same path
    #[error("Configuration error: duplicate log file path {}", .0.display())]
    DuplicateFilePath(PathBuf),

    /// A severity name could not be parsed
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    /// A record could not be serialized
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Writer I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Whether this error stems from logger configuration (the only kind
    /// ever returned from building a logger).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LogError::NoBuilders | LogError::NoValidSinks | LogError::DuplicateFilePath(_)
        )
    }
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
