// Snapshot data model (wire shape of GET /api/stats)

mod cpu;
mod disk;
mod memory;
mod network;
mod snapshot;

pub use cpu::{CpuCount, CpuFrequency, CpuSnapshot, CpuStatCounters, CpuTimes, CpuUsage};
pub use disk::DiskIo;
pub use memory::MemoryStats;
pub use network::NetworkIo;
pub use snapshot::{Metric, Snapshot};

/// Clamp a utilization ratio to [0, 100] and round to one decimal place.
pub fn round_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 100.0) * 10.0).round() / 10.0
}
