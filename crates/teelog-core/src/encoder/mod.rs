//! Record serialization.
//!
//! Encoders are pure: the same entry and configuration always produce the
//! same bytes, and nothing is written until a sink hands the bytes to its
//! writer.

pub mod console;
pub mod json;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::entry::{Entry, Field};
use crate::error::LogResult;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

/// The closed set of record encodings.
#[derive(Debug, Clone)]
pub enum Encoder {
    Json(JsonEncoder),
    Console(ConsoleEncoder),
}

impl Encoder {
    /// Serialize one entry, including the trailing line ending.
    pub fn encode(&self, entry: &Entry) -> LogResult<Vec<u8>> {
        match self {
            Encoder::Json(encoder) => encoder.encode(entry),
            Encoder::Console(encoder) => encoder.encode(entry),
        }
    }
}

/// Serializes fields as a JSON object, keeping insertion order.
pub(crate) struct FieldsObject<'a>(pub(crate) &'a [Field]);

impl Serialize for FieldsObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}
