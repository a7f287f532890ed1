// Host counters via sysinfo, with procfs readers for what sysinfo does not expose

mod linux;

use crate::error::{CollectError, Result};
use crate::models::*;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use sysinfo::{Disks, Networks, System};
use tracing::instrument;

/// OS-introspection adapter. Every read runs on the blocking pool.
///
/// The aggregate CPU reading keeps its own `System` as the reference point between
/// calls. sysinfo skips a usage refresh within its minimum interval of *any* CPU
/// refresh, so no other read may touch that instance. Windowed per-core samples
/// also use their own `System` so concurrent requests never wait on each other.
pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    /// `None` until the first aggregate reading establishes the reference point.
    aggregate: Arc<Mutex<Option<System>>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<'a, T>(m: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    m.lock()
        .map_err(|e| CollectError::Poisoned(format!("{}: {}", what, e)))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CollectError::Join(e.to_string()))?
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            aggregate: Arc::new(Mutex::new(None)),
            disks: Arc::new(Mutex::new(disks)),
            networks: Arc::new(Mutex::new(networks)),
        }
    }

    /// Measures per-core and global utilization over `window`, blocking for its full length.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "sample_cpu_usage"))]
    pub async fn sample_cpu_usage(&self, window: Duration) -> Result<CpuUsage> {
        blocking(move || {
            let mut sys = System::new();
            sys.refresh_cpu_usage();
            std::thread::sleep(window);
            sys.refresh_cpu_usage();
            Ok(CpuUsage {
                global: round_percent(sys.global_cpu_usage() as f64),
                per_core: sys
                    .cpus()
                    .iter()
                    .map(|c| round_percent(c.cpu_usage() as f64))
                    .collect(),
            })
        })
        .await
    }

    /// Aggregate utilization since the previous call. The first call only sets the
    /// reference point and reads 0.0.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "aggregate_cpu_percent"))]
    pub async fn aggregate_cpu_percent(&self) -> Result<f64> {
        let aggregate = self.aggregate.clone();
        blocking(move || {
            let mut aggregate = lock(&aggregate, "aggregate cpu")?;
            match aggregate.as_mut() {
                Some(sys) => {
                    sys.refresh_cpu_usage();
                    Ok(round_percent(sys.global_cpu_usage() as f64))
                }
                None => {
                    let mut sys = System::new();
                    sys.refresh_cpu_usage();
                    *aggregate = Some(sys);
                    Ok(0.0)
                }
            }
        })
        .await
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_count"))]
    pub async fn cpu_count(&self) -> Result<CpuCount> {
        let sys = self.sys.clone();
        blocking(move || {
            let sys = lock(&sys, "system")?;
            let logical = sys.cpus().len() as u64;
            Ok(CpuCount {
                physical: System::physical_core_count().map(|n| n as u64),
                logical: (logical > 0).then_some(logical),
            })
        })
        .await
    }

    /// Per-core frequencies; empty when the platform reports none.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_frequencies"))]
    pub async fn cpu_frequencies(&self) -> Result<Vec<CpuFrequency>> {
        let sys = self.sys.clone();
        blocking(move || {
            let mut sys = lock(&sys, "system")?;
            sys.refresh_cpu_frequency();
            if sys.cpus().iter().all(|c| c.frequency() == 0) {
                return Ok(vec![]);
            }
            Ok(sys
                .cpus()
                .iter()
                .enumerate()
                .map(|(id, c)| {
                    let (min, max) = linux::read_cpu_freq_bounds(id);
                    CpuFrequency {
                        current: c.frequency() as f64,
                        min,
                        max,
                    }
                })
                .collect())
        })
        .await
    }

    /// Kernel event counters; `Ok(None)` where the platform does not expose them.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_stats"))]
    pub async fn cpu_stats(&self) -> Result<Option<CpuStatCounters>> {
        blocking(|| match linux::read_proc_stat()? {
            Some(content) => linux::parse_cpu_stat_counters(&content).map(Some),
            None => Ok(None),
        })
        .await
    }

    /// CPU time-class breakdown; `Ok(None)` where the platform does not expose it.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_times"))]
    pub async fn cpu_times(&self) -> Result<Option<CpuTimes>> {
        blocking(|| match linux::read_proc_stat()? {
            Some(content) => linux::parse_cpu_times(&content).map(Some),
            None => Ok(None),
        })
        .await
    }

    /// 1/5/15 minute load averages; `None` on platforms without the primitive.
    pub fn load_average(&self) -> Option<[f64; 3]> {
        #[cfg(windows)]
        {
            None
        }
        #[cfg(not(windows))]
        {
            let load = System::load_average();
            Some([load.one, load.five, load.fifteen])
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "network_io"))]
    pub async fn network_io(&self) -> Result<NetworkIo> {
        let networks = self.networks.clone();
        blocking(move || {
            let mut networks = lock(&networks, "networks")?;
            networks.refresh(true);
            Ok(networks
                .list()
                .values()
                .fold(NetworkIo { bytes_sent: 0, bytes_recv: 0 }, |acc, data| NetworkIo {
                    bytes_sent: acc.bytes_sent.saturating_add(data.total_transmitted()),
                    bytes_recv: acc.bytes_recv.saturating_add(data.total_received()),
                }))
        })
        .await
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "disk_io"))]
    pub async fn disk_io(&self) -> Result<DiskIo> {
        let disks = self.disks.clone();
        blocking(move || {
            if let Some(io) = linux::read_disk_io()? {
                return Ok(io);
            }
            let mut disks = lock(&disks, "disks")?;
            disks.refresh(false);
            Ok(disks.list().iter().fold(DiskIo::default(), |acc, d| {
                let usage = d.usage();
                DiskIo {
                    read_bytes: acc.read_bytes.saturating_add(usage.total_read_bytes),
                    write_bytes: acc.write_bytes.saturating_add(usage.total_written_bytes),
                }
            }))
        })
        .await
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    pub async fn memory(&self) -> Result<MemoryStats> {
        let sys = self.sys.clone();
        blocking(move || {
            let mut sys = lock(&sys, "system")?;
            sys.refresh_memory();
            Ok(MemoryStats::from_totals(
                sys.total_memory(),
                sys.available_memory(),
            ))
        })
        .await
    }
}
