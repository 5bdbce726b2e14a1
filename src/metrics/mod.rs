//! Prometheus exposition. Command throughput/failure counters are registered
//! next to the code that increments them (see the lifecycle engine); this
//! module only gathers the default registry and encodes it for `/metrics`.

use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, Encoder, HistogramVec, TextEncoder};
use thiserror::Error;

lazy_static! {
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "fieldops_http_request_duration_seconds",
        "HTTP request latency by method and path",
        &["method", "path"]
    )
    .expect("metric can be created");
}

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to export metrics: {0}")]
    ExportError(String),
}

/// Render every registered metric in Prometheus text format.
pub async fn metrics_handler() -> Result<String, MetricsError> {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| MetricsError::ExportError(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| MetricsError::ExportError(e.to_string()))
}
