// Collection errors and their HTTP mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;

use crate::models::Metric;

/// Errors raised while reading host counters or assembling a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// An OS-exposed file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An OS-exposed file was read but its content is not in the expected format.
    #[error("malformed {path}: {detail}")]
    Parse { path: String, detail: String },

    #[error("sysinfo lock poisoned: {0}")]
    Poisoned(String),

    #[error("collector task join: {0}")]
    Join(String),

    /// A metric in the required set failed; the snapshot is discarded.
    #[error("required metric {metric} unavailable: {source}")]
    Required {
        metric: Metric,
        #[source]
        source: Box<CollectError>,
    },

    #[error("collection timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The background CPU sampler exited before publishing a sample.
    #[error("background CPU sampler stopped")]
    SamplerStopped,
}

impl CollectError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        CollectError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<String>, detail: impl Into<String>) -> Self {
        CollectError::Parse {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code for the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            CollectError::Timeout(_) => "collection_timeout",
            _ => "collection_failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CollectError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CollectError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, code = self.code(), "snapshot collection failed");
        let body = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CollectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_service_unavailable() {
        let err = CollectError::Timeout(Duration::from_millis(250));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "collection_timeout");
        assert_eq!(err.to_string(), "collection timed out after 250ms");
    }

    #[test]
    fn required_failure_names_metric_and_cause() {
        let err = CollectError::Required {
            metric: Metric::CpuStats,
            source: Box::new(CollectError::parse("/proc/stat", "missing ctxt line")),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "collection_failed");
        let msg = err.to_string();
        assert!(msg.contains("cpu_stats"));
        assert!(msg.contains("missing ctxt line"));
    }

    #[tokio::test]
    async fn required_failure_renders_collection_failed_body() {
        let err = CollectError::Required {
            metric: Metric::Memory,
            source: Box::new(CollectError::Poisoned("system: poisoned".into())),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "collection_failed");
        assert!(
            json["error"]["message"]
                .as_str()
                .is_some_and(|m| m.contains("memory"))
        );
    }
}
