// CPU models: utilization, counts, frequency, kernel counters, time classes

use serde::{Deserialize, Serialize};

/// `cpu` section of a snapshot. Optional readings serialize as `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub percent: Option<f64>,
    pub count: CpuCount,
    pub per_cpu_percent: Option<Vec<f64>>,
    pub frequencies: Vec<CpuFrequency>,
    pub stats: Option<CpuStatCounters>,
    pub times: Option<CpuTimes>,
    /// 1, 5 and 15 minute load averages; `null` where the platform has none.
    pub load_avg: Option<[f64; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuCount {
    pub physical: Option<u64>,
    pub logical: Option<u64>,
}

/// Per-core frequency in MHz. `min`/`max` are 0.0 when the platform does not report bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuFrequency {
    pub current: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuStatCounters {
    pub ctx_switches: u64,
    pub interrupts: u64,
    pub soft_interrupts: u64,
    pub syscalls: u64,
}

/// Cumulative CPU time per class, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: Option<f64>,
    pub irq: Option<f64>,
    pub softirq: Option<f64>,
}

/// One CPU utilization measurement over a sampling window.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuUsage {
    pub global: f64,
    pub per_core: Vec<f64>,
}
