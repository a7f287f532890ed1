// Snapshot collector: samples CPU usage, reads every counter, assembles one Snapshot.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::{AggregateWindow, AppConfig, CollectionConfig};
use crate::error::{CollectError, Result};
use crate::models::*;
use crate::sysinfo_repo::SysinfoRepo;

/// Where per-core CPU utilization comes from.
#[derive(Debug, Clone)]
pub enum CpuSource {
    /// Sample for `window` on every collection.
    Blocking { window: Duration },
    /// Read the latest sample published by [`crate::sampler`].
    Background(watch::Receiver<Option<CpuUsage>>),
}

/// Raw outcome of every sub-read, before the required-set policy is applied.
/// `Ok(None)` marks a metric the platform does not support.
#[derive(Debug)]
pub struct Readings {
    pub network: Result<NetworkIo>,
    /// Aggregate percent and per-core percents.
    pub cpu_percent: Result<(f64, Vec<f64>)>,
    pub cpu_stats: Result<Option<CpuStatCounters>>,
    pub cpu_times: Result<Option<CpuTimes>>,
    pub disk: Result<DiskIo>,
    pub memory: Result<MemoryStats>,
    pub count: CpuCount,
    pub frequencies: Vec<CpuFrequency>,
    pub load_avg: Option<[f64; 3]>,
}

pub struct SnapshotCollector {
    repo: Arc<SysinfoRepo>,
    cpu_source: CpuSource,
    aggregate: AggregateWindow,
    config: CollectionConfig,
}

impl SnapshotCollector {
    pub fn new(
        repo: Arc<SysinfoRepo>,
        cpu_source: CpuSource,
        aggregate: AggregateWindow,
        config: CollectionConfig,
    ) -> Self {
        Self {
            repo,
            cpu_source,
            aggregate,
            config,
        }
    }

    /// Collector for a blocking-mode config; background mode needs the sampler's receiver.
    pub fn from_config(repo: Arc<SysinfoRepo>, config: &AppConfig) -> Self {
        Self::new(
            repo,
            CpuSource::Blocking {
                window: config.cpu.sample_window(),
            },
            config.cpu.aggregate,
            config.collection.clone(),
        )
    }

    /// Takes one snapshot, bounded by the configured timeout.
    pub async fn collect(&self) -> Result<Snapshot> {
        let limit = self.config.timeout();
        tokio::time::timeout(limit, self.collect_unbounded())
            .await
            .map_err(|_| CollectError::Timeout(limit))?
    }

    async fn collect_unbounded(&self) -> Result<Snapshot> {
        // Stamped at request start, before the sample window.
        let timestamp = chrono::Utc::now().timestamp();
        let cpu_percent = match self.cpu_usage().await {
            Ok(usage) => match self.aggregate {
                AggregateWindow::SinceLastCall => self
                    .repo
                    .aggregate_cpu_percent()
                    .await
                    .map(|global| (global, usage.per_core)),
                AggregateWindow::SampleWindow => Ok((usage.global, usage.per_core)),
            },
            Err(e) => Err(e),
        };

        let (network, disk, memory, cpu_stats, cpu_times, count, frequencies) = tokio::join!(
            self.repo.network_io(),
            self.repo.disk_io(),
            self.repo.memory(),
            self.repo.cpu_stats(),
            self.repo.cpu_times(),
            self.repo.cpu_count(),
            self.repo.cpu_frequencies(),
        );

        let count = count.unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "cpu_count", "CPU count unavailable");
            CpuCount {
                physical: None,
                logical: None,
            }
        });
        let frequencies = frequencies.unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "cpu_frequencies", "CPU frequencies unavailable");
            vec![]
        });

        let snapshot = assemble(
            timestamp,
            Readings {
                network,
                cpu_percent,
                cpu_stats,
                cpu_times,
                disk,
                memory,
                count,
                frequencies,
                load_avg: self.repo.load_average(),
            },
            &self.config,
        )?;
        tracing::debug!(
            operation = "collect",
            timestamp = snapshot.timestamp,
            unavailable = ?snapshot.unavailable,
            "Snapshot collected"
        );
        Ok(snapshot)
    }

    async fn cpu_usage(&self) -> Result<CpuUsage> {
        match &self.cpu_source {
            CpuSource::Blocking { window } => self.repo.sample_cpu_usage(*window).await,
            CpuSource::Background(rx) => {
                let mut rx = rx.clone();
                let latest = rx
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| CollectError::SamplerStopped)?;
                let usage: Option<CpuUsage> = (*latest).clone();
                usage.ok_or(CollectError::SamplerStopped)
            }
        }
    }
}

/// Tracks which metrics ended up `null` and enforces the required set.
struct Outcomes<'a> {
    config: &'a CollectionConfig,
    unavailable: Vec<Metric>,
}

impl Outcomes<'_> {
    fn take<T>(&mut self, metric: Metric, reading: Result<Option<T>>) -> Result<Option<T>> {
        match reading {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => {
                self.unavailable.push(metric);
                Ok(None)
            }
            Err(e) if self.config.is_required(metric) => Err(CollectError::Required {
                metric,
                source: Box::new(e),
            }),
            Err(e) => {
                tracing::warn!(error = %e, metric = %metric, "optional metric failed; reporting null");
                self.unavailable.push(metric);
                Ok(None)
            }
        }
    }
}

/// Applies the required-set policy to raw readings and builds the snapshot.
///
/// Unsupported metrics become `null`. Failed metrics become `null` unless they are
/// required, in which case the whole snapshot fails.
pub fn assemble(timestamp: i64, readings: Readings, config: &CollectionConfig) -> Result<Snapshot> {
    let mut outcomes = Outcomes {
        config,
        unavailable: Vec::new(),
    };
    let network = outcomes.take(Metric::Network, readings.network.map(Some))?;
    let cpu_percent = outcomes.take(Metric::CpuPercent, readings.cpu_percent.map(Some))?;
    let stats = outcomes.take(Metric::CpuStats, readings.cpu_stats)?;
    let times = outcomes.take(Metric::CpuTimes, readings.cpu_times)?;
    let disk = outcomes.take(Metric::Disk, readings.disk.map(Some))?;
    let memory = outcomes.take(Metric::Memory, readings.memory.map(Some))?;

    let (percent, per_cpu_percent) = match cpu_percent {
        Some((global, per_core)) => (Some(global), Some(per_core)),
        None => (None, None),
    };

    Ok(Snapshot {
        timestamp,
        network,
        cpu: CpuSnapshot {
            percent,
            count: readings.count,
            per_cpu_percent,
            frequencies: readings.frequencies,
            stats,
            times,
            load_avg: readings.load_avg,
        },
        disk,
        memory,
        unavailable: outcomes.unavailable,
    })
}
