use anyhow::Context;
use axum::http::HeaderValue;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::models::Metric;

/// Config file used when `CONFIG_FILE` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cpu: CpuConfig,
    pub collection: CollectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS; `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8888,
            allowed_origins: vec!["*".into()],
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// How per-core CPU usage is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Each request blocks for one sample window.
    #[default]
    Blocking,
    /// A background task samples continuously; requests read the latest window.
    Background,
}

/// Window the aggregate `cpu.percent` is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateWindow {
    /// Since the previous collection; the first call after start reads 0.0.
    #[default]
    SinceLastCall,
    /// Same window as the per-core figures.
    SampleWindow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub sampling: SamplingMode,
    pub sample_window_ms: u64,
    pub aggregate: AggregateWindow,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingMode::Blocking,
            sample_window_ms: 1000,
            aggregate: AggregateWindow::SinceLastCall,
        }
    }
}

impl CpuConfig {
    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Upper bound on one whole collection, sample window included.
    pub timeout_ms: u64,
    /// Metrics whose failure fails the request instead of reporting `null`.
    pub required: Vec<Metric>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            required: Metric::ALL.to_vec(),
        }
    }
}

impl CollectionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_required(&self, metric: Metric) -> bool {
        self.required.contains(&metric)
    }
}

impl AppConfig {
    /// Loads `CONFIG_FILE` if set, else `config.toml` if present, else built-in defaults.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var("CONFIG_FILE") {
            return Self::load_from_path(path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::load_from_path(DEFAULT_CONFIG_PATH);
        }
        tracing::info!("No {} found; using built-in defaults", DEFAULT_CONFIG_PATH);
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.server.allowed_origins.is_empty(),
            "server.allowed_origins must list at least one origin (use \"*\" for any)"
        );
        for origin in &self.server.allowed_origins {
            anyhow::ensure!(
                origin == "*" || HeaderValue::from_str(origin).is_ok(),
                "server.allowed_origins entry {:?} is not a valid origin",
                origin
            );
        }
        let min_window = sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.as_millis() as u64;
        anyhow::ensure!(
            self.cpu.sample_window_ms >= min_window,
            "cpu.sample_window_ms must be >= {}, got {}",
            min_window,
            self.cpu.sample_window_ms
        );
        anyhow::ensure!(
            self.collection.timeout_ms > 0,
            "collection.timeout_ms must be > 0, got {}",
            self.collection.timeout_ms
        );
        if self.cpu.sampling == SamplingMode::Blocking {
            anyhow::ensure!(
                self.collection.timeout_ms > self.cpu.sample_window_ms,
                "collection.timeout_ms ({}) must exceed cpu.sample_window_ms ({}) in blocking mode",
                self.collection.timeout_ms,
                self.cpu.sample_window_ms
            );
        }
        Ok(())
    }
}
