//! Process health snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{get_current_pid, ProcessRefreshKind, ProcessesToUpdate, System};

const PROC_STATUS: &str = "/proc/self/status";

/// One reading of process counters. Counters the platform does not
/// expose are `None`.
///
/// Resident memory comes from `sysinfo` and is available on every
/// platform it supports. The thread count is read from `/proc` and is
/// only available on Linux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSample {
    pub taken_at: DateTime<Utc>,
    /// OS threads in this process
    pub threads: Option<u64>,
    /// Resident set size in KiB
    pub resident_kb: Option<u64>,
}

impl HealthSample {
    /// Read the current process's counters.
    pub fn capture() -> Self {
        let mut sample = match std::fs::read_to_string(PROC_STATUS) {
            Ok(status) => Self::from_status(&status),
            Err(_) => Self {
                taken_at: Utc::now(),
                threads: None,
                resident_kb: None,
            },
        };
        if let Some(resident_kb) = resident_kb() {
            sample.resident_kb = Some(resident_kb);
        }
        sample
    }

    /// Parse the contents of a Linux `/proc/<pid>/status` file.
    pub fn from_status(status: &str) -> Self {
        let mut threads = None;
        let mut resident_kb = None;

        for line in status.lines() {
            if let Some(value) = line.strip_prefix("Threads:") {
                threads = parse_leading_number(value);
            } else if let Some(value) = line.strip_prefix("VmRSS:") {
                resident_kb = parse_leading_number(value);
            }
        }

        Self {
            taken_at: Utc::now(),
            threads,
            resident_kb,
        }
    }
}

fn resident_kb() -> Option<u64> {
    let pid = get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    system.process(pid).map(|process| process.memory() / 1024)
}

fn parse_leading_number(value: &str) -> Option<u64> {
    value.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "Name:\tteelog\n\
                          State:\tS (sleeping)\n\
                          VmRSS:\t    8812 kB\n\
                          Threads:\t5\n";

    #[test]
    fn test_parse_status() {
        let sample = HealthSample::from_status(STATUS);
        assert_eq!(sample.threads, Some(5));
        assert_eq!(sample.resident_kb, Some(8812));
    }

    #[test]
    fn test_missing_counters() {
        let sample = HealthSample::from_status("Name:\tkernel-thread\nThreads:\tlots\n");
        assert_eq!(sample.threads, None);
        assert_eq!(sample.resident_kb, None);
    }

    #[test]
    fn test_capture_reports_memory() {
        let sample = HealthSample::capture();
        assert!(sample.resident_kb.unwrap() > 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_capture_threads_on_linux() {
        let sample = HealthSample::capture();
        assert!(sample.threads.unwrap() >= 1);
    }

    #[test]
    fn test_sample_serializes() {
        let sample = HealthSample::from_status(STATUS);
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["threads"], 5);
        assert_eq!(json["resident_kb"], 8812);
        assert!(json["taken_at"].is_string());
    }
}
