// Disk I/O counters

use serde::{Deserialize, Serialize};

/// Cumulative byte counters aggregated across whole block devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiskIo {
    pub read_bytes: u64,
    pub write_bytes: u64,
}
