//! Memory pressure watchdog
//!
//! A [`MemoryWatchdog`] compares a probe reading against a threshold. The
//! generation session polls it between tables and drops its template cache
//! when the process is above the threshold.

use std::fmt;

use tracing::{debug, warn};

/// Threshold used by [`MemoryWatchdog::with_default_threshold`]
pub const DEFAULT_THRESHOLD_BYTES: u64 = 100 * 1024 * 1024;

/// Source of the current process memory usage
pub trait MemoryProbe {
    /// Resident memory in bytes, or `None` if it cannot be determined
    fn resident_bytes(&self) -> Option<u64>;
}

/// Reads `VmRSS` from `/proc/self/status` (Linux only; `None` elsewhere)
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStatusProbe;

impl MemoryProbe for ProcStatusProbe {
    fn resident_bytes(&self) -> Option<u64> {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        parse_vm_rss(&status)
    }
}

/// Extract the `VmRSS` line of a `/proc/<pid>/status` dump, in bytes
pub fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let mut parts = line["VmRSS:".len()..].split_whitespace();
    let value: u64 = parts.next()?.parse().ok()?;
    let multiplier = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        Some("kb") | None => 1024,
        Some("mb") => 1024 * 1024,
        Some("gb") => 1024 * 1024 * 1024,
        Some("b") => 1,
        Some(_) => return None,
    };
    value.checked_mul(multiplier)
}

pub struct MemoryWatchdog {
    probe: Box<dyn MemoryProbe>,
    threshold_bytes: u64,
}

impl MemoryWatchdog {
    pub fn new(probe: Box<dyn MemoryProbe>, threshold_bytes: u64) -> Self {
        Self {
            probe,
            threshold_bytes,
        }
    }

    /// Watchdog over `/proc/self/status` with a 100 MB threshold
    pub fn with_default_threshold() -> Self {
        Self::new(Box::new(ProcStatusProbe), DEFAULT_THRESHOLD_BYTES)
    }

    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_bytes
    }

    /// Returns true (and logs a warning) when usage is above the threshold
    pub fn check(&self) -> bool {
        match self.probe.resident_bytes() {
            Some(used) if used > self.threshold_bytes => {
                warn!(
                    "Memory usage {} MB exceeds threshold {} MB",
                    used / (1024 * 1024),
                    self.threshold_bytes / (1024 * 1024)
                );
                true
            }
            Some(used) => {
                debug!("Memory usage {} bytes", used);
                false
            }
            None => false,
        }
    }
}

impl fmt::Debug for MemoryWatchdog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryWatchdog")
            .field("threshold_bytes", &self.threshold_bytes)
            .finish_non_exhaustive()
    }
}
