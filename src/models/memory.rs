// Virtual memory totals

use serde::{Deserialize, Serialize};

use super::round_percent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    pub available: u64,
    pub percent: f64,
}

impl MemoryStats {
    /// Builds the memory reading; `percent` is the used share of `total`.
    pub fn from_totals(total: u64, available: u64) -> Self {
        let used = total.saturating_sub(available);
        let percent = if total > 0 {
            round_percent((used as f64 / total as f64) * 100.0)
        } else {
            0.0
        };
        Self {
            total,
            available,
            percent,
        }
    }
}
