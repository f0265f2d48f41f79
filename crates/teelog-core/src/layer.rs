//! `tracing` integration.
//!
//! [`TeeLayer`] forwards `tracing` events into whatever handle is installed
//! in a [`LoggerCell`], so libraries instrumented with `tracing` log through
//! the same sinks as direct handle calls.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use serde_json::Value;
use tracing::field::{Field as TracingField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::entry::{Caller, Entry, Field};
use crate::handle::LoggerCell;
use crate::level::Level;

const OWN_TARGET: &str = "teelog_core";

/// A tracing Layer that writes events through a [`LoggerCell`].
///
/// Events are dropped while the cell is empty. Events emitted by this
/// crate are never forwarded.
#[derive(Debug, Clone)]
pub struct TeeLayer {
    cell: Arc<LoggerCell>,
}

impl TeeLayer {
    pub fn new(cell: Arc<LoggerCell>) -> Self {
        Self { cell }
    }

    pub fn cell(&self) -> &Arc<LoggerCell> {
        &self.cell
    }
}

/// TRACE has no counterpart and folds into debug.
pub fn level_from_tracing(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::ERROR => Level::Error,
    }
}

impl<S> Layer<S> for TeeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(OWN_TARGET) {
            return;
        }

        let level = level_from_tracing(metadata.level());
        if !self.cell.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                fields.push(Field::new("span", spans.join(" > ")));
            }
        }

        let mut entry = Entry::new(level, visitor.message.unwrap_or_default()).with_fields(fields);
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            entry = entry.with_caller(Caller::new(file, line));
        }

        self.cell.write_entry(entry);
    }
}

/// Collects an event's message and fields in declaration order.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<Field>,
}

impl FieldVisitor {
    fn push(&mut self, field: &TracingField, value: Value) {
        self.fields.push(Field::from((field.name(), value)));
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &TracingField, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);

        if field.name() == "message" {
            self.message = Some(buf);
        } else {
            self.push(field, Value::String(buf));
        }
    }

    fn record_str(&mut self, field: &TracingField, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, Value::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::with_level;
    use crate::sink::{console_sink_to, ConsoleTarget};
    use crate::writer::MemoryWriter;
    use tracing_subscriber::prelude::*;

    fn capture(level: Level) -> (Arc<LoggerCell>, MemoryWriter) {
        let buf = MemoryWriter::new();
        let cell = Arc::new(LoggerCell::new());
        cell.build_logger([console_sink_to(
            ConsoleTarget::Memory(buf.clone()),
            [with_level(level)],
        )])
        .unwrap();
        (cell, buf)
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_from_tracing(&tracing::Level::TRACE), Level::Debug);
        assert_eq!(level_from_tracing(&tracing::Level::INFO), Level::Info);
        assert_eq!(level_from_tracing(&tracing::Level::ERROR), Level::Error);
    }

    #[test]
    fn test_forwards_events_with_fields_and_span() {
        let (cell, buf) = capture(Level::Debug);
        let subscriber = tracing_subscriber::registry().with(TeeLayer::new(cell));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("request");
            let _guard = span.enter();
            tracing::info!(target: "app", user = "ada", attempts = 2u64, "signed in");
        });

        let lines = buf.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("signed in"));
        assert!(lines[0].contains(r#"{"user":"ada","attempts":2,"span":"request"}"#), "{}", lines[0]);
        assert!(lines[0].contains("src/layer.rs:"));
    }

    #[test]
    fn test_respects_sink_level() {
        let (cell, buf) = capture(Level::Warn);
        let subscriber = tracing_subscriber::registry().with(TeeLayer::new(cell));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "app", "quiet");
            tracing::warn!(target: "app", "loud");
        });

        let lines = buf.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("loud"));
    }

    #[test]
    fn test_skips_own_events() {
        let (cell, buf) = capture(Level::Debug);
        let subscriber = tracing_subscriber::registry().with(TeeLayer::new(cell.clone()));

        tracing::subscriber::with_default(subscriber, || {
            // Emits a debug event from inside this crate.
            cell.build_logger([console_sink_to(
                ConsoleTarget::Memory(buf.clone()),
                [with_level(Level::Debug)],
            )])
            .unwrap();
        });

        assert!(buf.is_empty());
    }
}
