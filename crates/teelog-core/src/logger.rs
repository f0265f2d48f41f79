//! The composite logger: a tee plus caller and stack trace capture.

use std::backtrace::Backtrace;
use std::collections::HashSet;
use std::path::Path;

use crate::entry::{Caller, Entry, Field};
use crate::error::{LogError, LogResult};
use crate::level::Level;
use crate::options::{with_file_path, with_level, with_rotate_settings};
use crate::sink::{console_sink, file_sink, SinkBuilder};
use crate::tee::{assemble, Tee};
use crate::writer::Writer;

/// Writes leveled records to every sink of a [`Tee`].
///
/// Each record carries the source location of the outermost
/// `#[track_caller]` frame, which is the application's call site for
/// every method on this type and on [`crate::Handle`].
#[derive(Debug)]
pub struct TeeLogger {
    tee: Tee,
    stacktrace_level: Level,
    add_caller: bool,
}

impl TeeLogger {
    /// Build every sink and combine them.
    ///
    /// `None` slots are skipped. Fails with [`LogError::NoBuilders`] when
    /// given no slots at all, [`LogError::DuplicateFilePath`] when two file
    /// builders share a path and [`LogError::NoValidSinks`] when no slot
    /// produced a sink.
    pub fn build<I>(builders: I) -> LogResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Option<SinkBuilder>>,
    {
        let slots: Vec<Option<SinkBuilder>> = builders.into_iter().map(Into::into).collect();
        if slots.is_empty() {
            return Err(LogError::NoBuilders);
        }

        let mut paths = HashSet::new();
        for path in slots.iter().flatten().filter_map(SinkBuilder::file_path) {
            if !paths.insert(path.clone()) {
                return Err(LogError::DuplicateFilePath(path));
            }
        }

        let tee = assemble(
            slots
                .iter()
                .map(|slot| slot.as_ref().and_then(SinkBuilder::build)),
        )?;
        Ok(Self::from_tee(tee))
    }

    pub fn from_tee(tee: Tee) -> Self {
        Self {
            tee,
            stacktrace_level: Level::Error,
            add_caller: true,
        }
    }

    /// Capture stack traces for records at or above `level`.
    pub fn with_stacktrace_level(mut self, level: Level) -> Self {
        self.stacktrace_level = level;
        self
    }

    /// Report sink write failures to `writer` instead of stderr.
    pub fn with_error_output(mut self, writer: Writer) -> Self {
        self.tee = self.tee.with_error_output(writer);
        self
    }

    /// Stop attaching the call site to records.
    pub fn without_caller(mut self) -> Self {
        self.add_caller = false;
        self
    }

    pub fn tee(&self) -> &Tee {
        &self.tee
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.tee.enabled(level)
    }

    /// Write one record. Sink failures are reported on stderr, never returned.
    #[track_caller]
    pub fn log(&self, level: Level, message: &str, fields: impl IntoIterator<Item = Field>) {
        if !self.enabled(level) {
            return;
        }
        let mut entry = Entry::new(level, message).with_fields(fields);
        if self.add_caller {
            entry = entry.with_caller(Caller::here());
        }
        self.log_entry(entry);
    }

    /// Write a prepared record, adding a stack trace if its level calls for one.
    pub fn log_entry(&self, mut entry: Entry) {
        if entry.stacktrace.is_none() && entry.level >= self.stacktrace_level {
            entry.stacktrace = Some(Backtrace::force_capture().to_string());
        }
        self.tee.write(&entry);
    }

    pub fn flush(&self) -> LogResult<()> {
        self.tee.flush()
    }
}

/// The stock pair of sinks: a compressed rolling file (10 MB, 7 days) at
/// `path` and a stdout console, both admitting `level` and above.
pub fn standard_builders(level: Level, path: impl AsRef<Path>) -> Vec<SinkBuilder> {
    vec![
        file_sink([
            with_level(level),
            with_file_path(path.as_ref()),
            with_rotate_settings(10, 7, true),
        ]),
        console_sink([with_level(level)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{console_sink_to, ConsoleTarget};
    use crate::writer::MemoryWriter;

    fn captured(level: Level) -> (TeeLogger, MemoryWriter) {
        let buf = MemoryWriter::new();
        let logger =
            TeeLogger::build([console_sink_to(ConsoleTarget::Memory(buf.clone()), [with_level(level)])])
                .unwrap();
        (logger, buf)
    }

    #[test]
    fn test_build_without_builders_fails() {
        let err = TeeLogger::build(Vec::<SinkBuilder>::new()).unwrap_err();
        assert!(matches!(err, LogError::NoBuilders));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_build_with_only_absent_builders_fails() {
        let err = TeeLogger::build([None::<SinkBuilder>, None]).unwrap_err();
        assert!(matches!(err, LogError::NoValidSinks));

        let err = TeeLogger::build([file_sink([with_file_path("")])]).unwrap_err();
        assert!(matches!(err, LogError::NoValidSinks));
    }

    #[test]
    fn test_log_records_call_site() {
        let (logger, buf) = captured(Level::Debug);

        let line = line!() + 1;
        logger.log(Level::Info, "here", []);

        let output = buf.contents();
        assert!(output.contains(&format!("src/logger.rs:{}", line)), "{}", output);
    }

    #[test]
    fn test_stacktrace_only_at_threshold() {
        let (logger, buf) = captured(Level::Debug);

        logger.log(Level::Warn, "no trace", []);
        assert_eq!(buf.lines().len(), 1);

        buf.clear();
        logger.log(Level::Error, "with trace", []);
        assert!(buf.lines().len() > 1);
    }

    #[test]
    fn test_custom_stacktrace_level_and_no_caller() {
        let (logger, buf) = captured(Level::Debug);
        let logger = logger.with_stacktrace_level(Level::Fatal).without_caller();

        logger.log(Level::Error, "plain", [Field::new("attempt", 3)]);

        let lines = buf.lines();
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].contains("logger.rs"));
        assert!(lines[0].contains(r#"{"attempt":3}"#));
    }

    #[test]
    fn test_standard_builders() {
        let builders = standard_builders(Level::Warn, "logs/app.log");
        assert_eq!(builders.len(), 2);

        let file = builders[0].config();
        assert_eq!(file.level, Level::Warn);
        assert_eq!(file.file_path, Path::new("logs/app.log"));
        assert_eq!(file.rotation.max_size_mb, 10);
        assert_eq!(file.rotation.max_age_days, 7);
        assert!(file.rotation.compress);
        assert!(matches!(builders[1], SinkBuilder::Console { .. }));
        assert_eq!(builders[1].config().level, Level::Warn);
    }

    #[test]
    fn test_duplicate_file_paths_rejected() {
        let err = TeeLogger::build([
            file_sink([with_file_path("logs/shared.log"), with_level(Level::Info)]),
            console_sink([]),
            file_sink([with_file_path("logs/shared.log"), with_level(Level::Error)]),
        ])
        .unwrap_err();

        assert!(matches!(err, LogError::DuplicateFilePath(ref p) if p == Path::new("logs/shared.log")));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_write_failures_reach_error_output() {
        let temp = tempfile::TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let (buf, errors) = (MemoryWriter::new(), MemoryWriter::new());

        let logger = TeeLogger::build([
            file_sink([with_file_path(blocker.join("app.log"))]),
            console_sink_to(ConsoleTarget::Memory(buf.clone()), [with_level(Level::Debug)]),
        ])
        .unwrap()
        .with_error_output(Writer::Memory(errors.clone()));

        logger.log(Level::Info, "kept", []);

        assert!(buf.contents().contains("kept"));
        assert!(errors.contents().contains("teelog write error"));
    }
}
