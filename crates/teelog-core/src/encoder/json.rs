//! One JSON object per line.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::EncoderConfig;
use crate::entry::Entry;
use crate::error::LogResult;

/// Encodes entries as `{"level":..,"time":..,"caller":..,"msg":..,<fields>,"stacktrace":..}`.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn encode(&self, entry: &Entry) -> LogResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(256);
        serde_json::to_writer(
            &mut buf,
            &JsonRecord {
                config: &self.config,
                entry,
            },
        )?;
        buf.extend_from_slice(self.config.line_ending.as_bytes());
        Ok(buf)
    }
}

struct JsonRecord<'a> {
    config: &'a EncoderConfig,
    entry: &'a Entry,
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cfg = self.config;
        let entry = self.entry;
        let mut map = serializer.serialize_map(None)?;

        if !cfg.level_key.is_empty() {
            map.serialize_entry(&cfg.level_key, &cfg.level_format.format(entry.level))?;
        }
        if !cfg.time_key.is_empty() {
            map.serialize_entry(&cfg.time_key, &cfg.time_format.format(&entry.time))?;
        }
        if !cfg.caller_key.is_empty() {
            if let Some(caller) = &entry.caller {
                map.serialize_entry(&cfg.caller_key, &cfg.caller_format.format(caller))?;
            }
        }
        if !cfg.message_key.is_empty() {
            map.serialize_entry(&cfg.message_key, &entry.message)?;
        }
        for field in &entry.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        if !cfg.stacktrace_key.is_empty() {
            if let Some(stacktrace) = &entry.stacktrace {
                map.serialize_entry(&cfg.stacktrace_key, stacktrace)?;
            }
        }

        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeFormat;
    use crate::entry::{Caller, Field};
    use crate::level::Level;
    use serde_json::Value;

    fn encode_line(config: EncoderConfig, entry: &Entry) -> String {
        let bytes = JsonEncoder::new(config).encode(entry).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_single_line_with_default_keys() {
        let entry = Entry::new(Level::Info, "Connected to peer")
            .with_caller(Caller::new("src/sync/gossip.rs", 88))
            .with_fields([Field::new("peer_id", "abc123"), Field::new("size", 1024)]);

        let line = encode_line(EncoderConfig::default(), &entry);
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);

        let parsed: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["msg"], "Connected to peer");
        assert_eq!(parsed["caller"], "sync/gossip.rs:88");
        assert_eq!(parsed["peer_id"], "abc123");
        assert_eq!(parsed["size"], 1024);
        assert!(parsed.get("stacktrace").is_none());
    }

    #[test]
    fn test_key_order() {
        let entry = Entry::new(Level::Error, "boom")
            .with_caller(Caller::new("a/b.rs", 1))
            .with_fields([Field::new("k", 1)])
            .with_stacktrace("trace");

        let line = encode_line(EncoderConfig::default(), &entry);
        let positions: Vec<usize> = ["\"level\"", "\"time\"", "\"caller\"", "\"msg\"", "\"k\"", "\"stacktrace\""]
            .iter()
            .map(|key| line.find(*key).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_custom_and_empty_keys() {
        let config = EncoderConfig {
            level_key: "severity".to_string(),
            message_key: "message".to_string(),
            time_key: String::new(),
            time_format: TimeFormat::Millis,
            ..EncoderConfig::default()
        };
        let entry = Entry::new(Level::Warn, "slow disk");

        let parsed: Value = serde_json::from_str(encode_line(config, &entry).trim_end()).unwrap();
        assert_eq!(parsed["severity"], "warn");
        assert_eq!(parsed["message"], "slow disk");
        assert!(parsed.get("time").is_none());
        assert!(parsed.get("level").is_none());
    }

    #[test]
    fn test_message_is_escaped() {
        let entry = Entry::new(Level::Info, "line one\nline \"two\"");
        let line = encode_line(EncoderConfig::default(), &entry);
        assert_eq!(line.lines().count(), 1);
        let parsed: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["msg"], "line one\nline \"two\"");
    }
}
