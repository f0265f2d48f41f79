//! Fan-out of one record to many sinks.

use parking_lot::Mutex;

use crate::entry::Entry;
use crate::error::{LogError, LogResult};
use crate::level::Level;
use crate::sink::Sink;
use crate::writer::Writer;

/// A non-empty set of sinks written as one.
///
/// Sink write failures are reported to an error output (stderr unless
/// replaced). Failures of the error output itself are ignored.
#[derive(Debug)]
pub struct Tee {
    sinks: Vec<Sink>,
    error_output: Mutex<Writer>,
}

impl Tee {
    /// Combine `sinks`. Fails with [`LogError::NoValidSinks`] when empty.
    pub fn new(sinks: Vec<Sink>) -> LogResult<Self> {
        if sinks.is_empty() {
            return Err(LogError::NoValidSinks);
        }
        Ok(Self {
            sinks,
            error_output: Mutex::new(Writer::Stderr),
        })
    }

    /// Report sink write failures to `writer` instead of stderr.
    pub fn with_error_output(mut self, writer: Writer) -> Self {
        self.error_output = Mutex::new(writer);
        self
    }

    /// Whether any sink would accept `level`.
    pub fn enabled(&self, level: Level) -> bool {
        self.sinks.iter().any(|sink| sink.enabled(level))
    }

    /// Deliver `entry` to every sink that admits its severity.
    ///
    /// Returns once every sink has accepted or rejected it. A failing sink
    /// does not stop delivery to the others; its error goes to the error
    /// output and the record is dropped for that sink.
    pub fn write(&self, entry: &Entry) {
        for sink in &self.sinks {
            if let Err(e) = sink.write(entry) {
                self.report(entry, &e);
            }
        }
    }

    fn report(&self, entry: &Entry, err: &LogError) {
        let line = format!(
            "{} teelog write error: {}\n",
            entry.time.format("%Y-%m-%d %H:%M:%S%.3f"),
            err
        );
        let _ = self.error_output.lock().write_all(line.as_bytes());
    }

    /// Flush every sink, returning the first error after trying all of them.
    pub fn flush(&self) -> LogResult<()> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

/// Skip absent slots and combine the rest.
pub fn assemble(sinks: impl IntoIterator<Item = Option<Sink>>) -> LogResult<Tee> {
    Tee::new(sinks.into_iter().flatten().collect())
}
