//! The replaceable logger handle and the slot that owns it.
//!
//! ```text
//! Absent --install(v1)--> Active(v1) --install(v2)--> flush(v1); Active(v2)
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use crate::entry::{Entry, Field};
use crate::error::LogResult;
use crate::level::Level;
use crate::logger::TeeLogger;
use crate::sink::SinkBuilder;

/// Cheap, cloneable reference to one [`TeeLogger`].
///
/// All leveled methods are `#[track_caller]`, so records carry the
/// location of the code calling the handle.
#[derive(Debug, Clone)]
pub struct Handle {
    inner: Arc<TeeLogger>,
}

impl Handle {
    pub fn new(logger: TeeLogger) -> Self {
        Self {
            inner: Arc::new(logger),
        }
    }

    /// Build a logger from `builders` and wrap it. Nothing is installed.
    pub fn build<I>(builders: I) -> LogResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Option<SinkBuilder>>,
    {
        Ok(Self::new(TeeLogger::build(builders)?))
    }

    pub fn logger(&self) -> &TeeLogger {
        &self.inner
    }

    #[track_caller]
    pub fn write(&self, level: Level, message: &str, fields: impl IntoIterator<Item = Field>) {
        self.inner.log(level, message, fields);
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.inner.log(Level::Debug, message, []);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.inner.log(Level::Info, message, []);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.inner.log(Level::Warn, message, []);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.inner.log(Level::Error, message, []);
    }

    /// Log, flush, then panic with `message`.
    #[track_caller]
    pub fn panic(&self, message: &str) -> ! {
        self.inner.log(Level::Panic, message, []);
        let _ = self.inner.flush();
        panic!("{}", message);
    }

    /// Log at fatal and flush every sink, then return.
    ///
    /// This never terminates the process, unlike fatal logging in many
    /// other loggers. Callers that must stop after a fatal record do so
    /// themselves, e.g. `handle.fatal(msg); std::process::exit(1)`.
    #[track_caller]
    pub fn fatal(&self, message: &str) {
        self.inner.log(Level::Fatal, message, []);
        let _ = self.inner.flush();
    }

    pub fn flush(&self) -> LogResult<()> {
        self.inner.flush()
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    /// Whether both handles refer to the same logger.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Owner of the current [`Handle`].
///
/// Components that need the active logger receive the cell (usually in an
/// `Arc`) rather than reading a global. Writes through the cell hold its
/// read lock, so [`LoggerCell::install`] waits for them and then flushes the
/// outgoing handle before the new one becomes visible.
#[derive(Debug, Default)]
pub struct LoggerCell {
    slot: RwLock<Option<Handle>>,
}

impl LoggerCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current handle, flushing the previous one first.
    ///
    /// Flush errors are ignored. Returns the handle now installed.
    pub fn install(&self, handle: Handle) -> Handle {
        let replaced = {
            let mut slot = self.slot.write();
            let replaced = slot.is_some();
            if let Some(previous) = slot.as_ref() {
                let _ = previous.flush();
            }
            *slot = Some(handle.clone());
            replaced
        };
        tracing::debug!(replaced, "installed logger handle");
        handle
    }

    /// Build a logger from `builders` and install it.
    ///
    /// On error the current handle stays in place.
    pub fn build_logger<I>(&self, builders: I) -> LogResult<Handle>
    where
        I: IntoIterator,
        I::Item: Into<Option<SinkBuilder>>,
    {
        let handle = Handle::build(builders)?;
        Ok(self.install(handle))
    }

    pub fn current(&self) -> Option<Handle> {
        self.slot.read().clone()
    }

    pub fn is_installed(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Write through the current handle; a no-op while nothing is installed.
    #[track_caller]
    pub fn write(&self, level: Level, message: &str, fields: impl IntoIterator<Item = Field>) {
        if let Some(handle) = self.slot.read().as_ref() {
            handle.write(level, message, fields);
        }
    }

    /// Write a prepared record through the current handle.
    pub fn write_entry(&self, entry: Entry) {
        if let Some(handle) = self.slot.read().as_ref() {
            handle.logger().log_entry(entry);
        }
    }

    /// Whether the current handle would accept `level`.
    pub fn enabled(&self, level: Level) -> bool {
        self.slot
            .read()
            .as_ref()
            .map_or(false, |handle| handle.enabled(level))
    }

    pub fn flush(&self) -> LogResult<()> {
        match self.slot.read().as_ref() {
            Some(handle) => handle.flush(),
            None => Ok(()),
        }
    }
}
