//! Log records as they travel from a handle to the sinks.

use std::panic::Location;

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::level::Level;

/// Source location of a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
}

impl Caller {
    pub fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// The location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn here() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    /// Last directory and file name plus line, e.g. `src/main.rs:42`.
    pub fn short(&self) -> String {
        let is_sep = |c: char| c == '/' || c == '\\';
        let file = self.file;
        let trimmed = match file.rfind(is_sep) {
            Some(last) => match file[..last].rfind(is_sep) {
                Some(prev) => &file[prev + 1..],
                None => file,
            },
            None => file,
        };
        format!("{}:{}", trimmed, self.line)
    }

    /// Full recorded path plus line.
    pub fn full(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// A structured key/value attached to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    /// Build a field from any serializable value. Values that fail to
    /// serialize are kept as their error text rather than dropped.
    pub fn new(key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| Value::String(e.to_string()));
        Self {
            key: key.into(),
            value,
        }
    }
}

impl<K: Into<String>> From<(K, Value)> for Field {
    fn from((key, value): (K, Value)) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// One log record.
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Local>,
    pub message: String,
    pub caller: Option<Caller>,
    pub stacktrace: Option<String>,
    /// Structured fields, in the order they were supplied
    pub fields: Vec<Field>,
}

impl Entry {
    /// Create a record stamped with the current local time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            time: Local::now(),
            message: message.into(),
            caller: None,
            stacktrace: None,
            fields: Vec::new(),
        }
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }
}
