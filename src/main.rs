use anyhow::Result;
use hostprobe::collector::{CpuSource, SnapshotCollector};
use hostprobe::config::SamplingMode;
use hostprobe::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let sysinfo_repo = Arc::new(sysinfo_repo::SysinfoRepo::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let (cpu_source, sampler_handle) = match app_config.cpu.sampling {
        SamplingMode::Blocking => {
            drop(shutdown_rx);
            (
                CpuSource::Blocking {
                    window: app_config.cpu.sample_window(),
                },
                None,
            )
        }
        SamplingMode::Background => {
            let (handle, rx) = sampler::spawn(
                sysinfo_repo.clone(),
                sampler::SamplerConfig {
                    window: app_config.cpu.sample_window(),
                },
                shutdown_rx,
            );
            (CpuSource::Background(rx), Some(handle))
        }
    };

    let collector = Arc::new(SnapshotCollector::new(
        sysinfo_repo,
        cpu_source,
        app_config.cpu.aggregate,
        app_config.collection.clone(),
    ));
    let app = routes::app(collector, &app_config.server);

    let addr = app_config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        sampling = ?app_config.cpu.sampling,
        sample_window_ms = app_config.cpu.sample_window_ms,
        "{} listening on http://{}",
        version::banner(),
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    if let Some(handle) = sampler_handle {
        let _ = handle.await;
    }

    Ok(())
}
