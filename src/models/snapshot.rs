// Snapshot: one point-in-time reading of every tracked host metric

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{CpuSnapshot, DiskIo, MemoryStats, NetworkIo};

/// Independently collected metric groups. A metric can be present, unsupported
/// on this platform, or failed; the latter two serialize as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Network,
    CpuPercent,
    CpuStats,
    CpuTimes,
    Disk,
    Memory,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Network,
        Metric::CpuPercent,
        Metric::CpuStats,
        Metric::CpuTimes,
        Metric::Disk,
        Metric::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Network => "network",
            Metric::CpuPercent => "cpu_percent",
            Metric::CpuStats => "cpu_stats",
            Metric::CpuTimes => "cpu_times",
            Metric::Disk => "disk",
            Metric::Memory => "memory",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable once built; each request gets a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix seconds at collection time.
    pub timestamp: i64,
    pub network: Option<NetworkIo>,
    pub cpu: CpuSnapshot,
    pub disk: Option<DiskIo>,
    pub memory: Option<MemoryStats>,
    /// Metrics reported as `null` in this snapshot, in collection order.
    pub unavailable: Vec<Metric>,
}
