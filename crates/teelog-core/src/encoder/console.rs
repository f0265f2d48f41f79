//! Human-readable console lines.

use crate::config::EncoderConfig;
use crate::entry::Entry;
use crate::error::LogResult;

use super::FieldsObject;

/// Encodes entries as tab-separated `time level caller msg {fields}` lines,
/// with any stack trace on the following line.
#[derive(Debug, Clone)]
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn encode(&self, entry: &Entry) -> LogResult<Vec<u8>> {
        let cfg = &self.config;
        let mut parts: Vec<String> = Vec::with_capacity(5);

        if !cfg.time_key.is_empty() {
            parts.push(cfg.time_format.format(&entry.time));
        }
        if !cfg.level_key.is_empty() {
            parts.push(cfg.level_format.format(entry.level).into_owned());
        }
        if !cfg.caller_key.is_empty() {
            if let Some(caller) = &entry.caller {
                parts.push(cfg.caller_format.format(caller));
            }
        }
        if !cfg.message_key.is_empty() {
            parts.push(entry.message.clone());
        }
        if !entry.fields.is_empty() {
            parts.push(serde_json::to_string(&FieldsObject(&entry.fields))?);
        }

        let mut line = parts.join("\t");
        line.push_str(&cfg.line_ending);
        if !cfg.stacktrace_key.is_empty() {
            if let Some(stacktrace) = &entry.stacktrace {
                line.push_str(stacktrace);
                line.push_str(&cfg.line_ending);
            }
        }

        Ok(line.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LevelFormat, TimeFormat};
    use crate::entry::{Caller, Field};
    use crate::level::Level;

    fn colored_config() -> EncoderConfig {
        EncoderConfig {
            level_format: LevelFormat::Color,
            time_format: TimeFormat::Color,
            ..EncoderConfig::default()
        }
    }

    #[test]
    fn test_console_line_layout() {
        let entry = Entry::new(Level::Info, "ready")
            .with_caller(Caller::new("src/main.rs", 10))
            .with_fields([Field::new("port", 8080)]);

        let bytes = ConsoleEncoder::new(colored_config()).encode(&entry).unwrap();
        let line = String::from_utf8(bytes).unwrap();
        let parts: Vec<&str> = line.trim_end().split('\t').collect();

        assert_eq!(parts.len(), 5);
        assert!(parts[0].starts_with("\x1b[36m"));
        assert_eq!(parts[1], "\x1b[32mINFO\x1b[0m");
        assert_eq!(parts[2], "src/main.rs:10");
        assert_eq!(parts[3], "ready");
        assert_eq!(parts[4], r#"{"port":8080}"#);
    }

    #[test]
    fn test_field_order_preserved() {
        let entry = Entry::new(Level::Debug, "m")
            .with_fields([Field::new("zeta", 1), Field::new("alpha", 2)]);
        let line =
            String::from_utf8(ConsoleEncoder::new(EncoderConfig::default()).encode(&entry).unwrap())
                .unwrap();
        assert!(line.contains(r#"{"zeta":1,"alpha":2}"#));
    }

    #[test]
    fn test_stacktrace_on_next_line() {
        let entry = Entry::new(Level::Fatal, "dying").with_stacktrace("0: main");
        let line =
            String::from_utf8(ConsoleEncoder::new(colored_config()).encode(&entry).unwrap())
                .unwrap();
        let lines: Vec<&str> = line.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\x1b[35mFATAL\x1b[0m"));
        assert_eq!(lines[1], "0: main");
    }
}
