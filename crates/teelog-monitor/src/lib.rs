//! # teelog-monitor
//!
//! Periodic process health sampling. A [`Monitor`] reads the thread count
//! and resident memory on a fixed interval, reports each sample through
//! `tracing` and publishes the latest one on a watch channel.
//!
//! The monitor knows nothing about teelog sinks: hosts that want the
//! samples in their log files install `teelog_core::TeeLayer`.

pub mod monitor;
pub mod sample;

pub use monitor::{Monitor, DEFAULT_INTERVAL};
pub use sample::HealthSample;
