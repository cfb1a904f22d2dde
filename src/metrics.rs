use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and register metric descriptions.
///
/// Fails if a global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "ecocycle_classifications_total",
        "Total number of completed classifications"
    );
    describe_histogram!(
        "ecocycle_classification_duration_seconds",
        "End-to-end classification duration in seconds"
    );
    describe_counter!(
        "ecocycle_upstream_errors_total",
        "Total number of failed model provider calls"
    );
    describe_counter!(
        "ecocycle_rejected_uploads_total",
        "Total number of uploads rejected before any model call"
    );
    describe_gauge!("ecocycle_info", "Service version information");

    gauge!("ecocycle_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a completed classification
pub fn record_classification(category: &str, recyclable: bool, tier: &str, duration: Duration) {
    counter!(
        "ecocycle_classifications_total",
        "category" => category.to_string(),
        "recyclable" => recyclable.to_string(),
        "tier" => tier.to_string(),
    )
    .increment(1);

    histogram!("ecocycle_classification_duration_seconds").record(duration.as_secs_f64());
}

/// Record a failed upstream call
pub fn record_upstream_error(kind: &str) {
    counter!("ecocycle_upstream_errors_total", "kind" => kind.to_string()).increment(1);
}

/// Record an upload rejected as invalid input
pub fn record_rejected_upload() {
    counter!("ecocycle_rejected_uploads_total").increment(1);
}
