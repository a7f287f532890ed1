// Shared test helpers

#![allow(dead_code)]

use hostprobe::config::{AppConfig, CollectionConfig};
use hostprobe::models::*;

/// Blocking-mode config with the default one-second window.
pub fn blocking_config() -> AppConfig {
    AppConfig::load_from_str("").unwrap()
}

/// Required set empty so a host missing a counter still yields a snapshot.
pub fn lenient_collection() -> CollectionConfig {
    CollectionConfig {
        required: vec![],
        ..CollectionConfig::default()
    }
}

pub fn full_snapshot(timestamp: i64) -> Snapshot {
    Snapshot {
        timestamp,
        network: Some(NetworkIo {
            bytes_sent: 1_000,
            bytes_recv: 2_000,
        }),
        cpu: CpuSnapshot {
            percent: Some(25.0),
            count: CpuCount {
                physical: Some(2),
                logical: Some(4),
            },
            per_cpu_percent: Some(vec![10.0, 20.0, 30.0, 40.0]),
            frequencies: vec![CpuFrequency {
                current: 2400.0,
                min: 800.0,
                max: 3600.0,
            }],
            stats: Some(CpuStatCounters {
                ctx_switches: 100,
                interrupts: 200,
                soft_interrupts: 300,
                syscalls: 0,
            }),
            times: Some(CpuTimes {
                user: 10.5,
                system: 4.25,
                idle: 100.0,
                iowait: Some(0.5),
                irq: Some(0.0),
                softirq: Some(0.25),
            }),
            load_avg: Some([0.5, 0.25, 0.125]),
        },
        disk: Some(DiskIo {
            read_bytes: 4096,
            write_bytes: 8192,
        }),
        memory: Some(MemoryStats::from_totals(8_000, 2_000)),
        unavailable: vec![],
    }
}

/// Every key path a snapshot must carry, optional ones included.
pub const SNAPSHOT_PATHS: &[&str] = &[
    "/timestamp",
    "/network/bytes_sent",
    "/network/bytes_recv",
    "/cpu/percent",
    "/cpu/count/physical",
    "/cpu/count/logical",
    "/cpu/per_cpu_percent",
    "/cpu/frequencies",
    "/cpu/stats",
    "/cpu/times",
    "/cpu/load_avg",
    "/disk/read_bytes",
    "/disk/write_bytes",
    "/memory/total",
    "/memory/available",
    "/memory/percent",
    "/unavailable",
];

/// Asserts every path resolves, allowing `null` where a whole group may be unavailable.
pub fn assert_schema(json: &serde_json::Value) {
    for path in SNAPSHOT_PATHS {
        let parent_null = path
            .rsplit_once('/')
            .map(|(parent, _)| !parent.is_empty() && json.pointer(parent) == Some(&serde_json::Value::Null))
            .unwrap_or(false);
        assert!(
            parent_null || json.pointer(path).is_some(),
            "missing {} in {}",
            path,
            json
        );
    }
}
