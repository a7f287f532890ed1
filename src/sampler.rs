// Background CPU sampler: measures utilization back-to-back and publishes the latest window.
// Requests then read the most recent sample instead of blocking for a fresh one, so the
// figures they return can be up to one window old.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tracing::Instrument;

use crate::models::CpuUsage;
use crate::sysinfo_repo::SysinfoRepo;

pub struct SamplerConfig {
    pub window: Duration,
}

/// Spawns the sampling loop. The receiver holds `None` until the first window completes.
/// The loop exits when `shutdown_rx` fires or its sender is dropped.
pub fn spawn(
    repo: Arc<SysinfoRepo>,
    config: SamplerConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> (
    tokio::task::JoinHandle<()>,
    watch::Receiver<Option<CpuUsage>>,
) {
    let (tx, rx) = watch::channel(None);
    let window = config.window;
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "sampler",
        window_ms = window.as_millis() as u64
    );

    let handle = tokio::spawn(
        async move {
            let mut samples_total: u64 = 0;
            loop {
                tokio::select! {
                    result = repo.sample_cpu_usage(window) => {
                        match result {
                            Ok(usage) => {
                                samples_total += 1;
                                tx.send_replace(Some(usage));
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    operation = "sample_cpu_usage",
                                    "CPU sample failed"
                                );
                                if back_off(window, &mut shutdown_rx).await {
                                    tracing::debug!(samples_total, "CPU sampler shutting down");
                                    break;
                                }
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!(samples_total, "CPU sampler shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(span),
    );

    (handle, rx)
}

/// Waits out `window` after a failed sample; true if shutdown arrived first.
async fn back_off(window: Duration, shutdown_rx: &mut oneshot::Receiver<()>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(window) => false,
        _ = shutdown_rx => true,
    }
}
