// Network I/O counters

use serde::{Deserialize, Serialize};

/// Cumulative byte counters summed over every interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIo {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}
