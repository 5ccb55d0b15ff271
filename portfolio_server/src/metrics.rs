//! Prometheus metrics for the portfolio service.

use metrics::{counter, histogram};

/// Initialize metrics exporter (Prometheus).
pub fn init_metrics() {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a successful content mutation.
pub fn mutation(collection: &str, op: &'static str) {
    counter!("portfolio_mutations_total", "collection" => collection.to_string(), "op" => op)
        .increment(1);
}

/// Record a reorder attempt outcome (`applied` or `rejected`).
pub fn reorder(outcome: &'static str) {
    counter!("portfolio_reorders_total", "outcome" => outcome).increment(1);
}

/// Record an upload attempt outcome.
pub fn upload(kind: &str, outcome: &'static str) {
    counter!("portfolio_uploads_total", "kind" => kind.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Record stored upload size.
pub fn upload_bytes(kind: &str, bytes: u64) {
    histogram!("portfolio_upload_bytes", "kind" => kind.to_string()).record(bytes as f64);
}

/// Record a site list answered from fallback content.
pub fn fallback_served(section: &'static str) {
    counter!("portfolio_fallback_served_total", "section" => section).increment(1);
}
