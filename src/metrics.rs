//! Prometheus metrics for application observability.
//!
//! Metrics are exposed via a dedicated HTTP listener (default port 9090).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `fio_records_enqueued_total` - Send attempts (labels: topic, status = accepted/rejected/closed)
//! - `fio_deliveries_total` - Delivery reports (labels: topic, outcome = delivered/failed)
//!
//! ## Histograms
//! - `fio_send_duration_seconds` - Time from `send` entry to local enqueue
//! - `fio_batch_size` - Records per list submission
//!
//! Recording without an installed exporter is a no-op, so unit tests can
//! call into instrumented code freely.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const RECORDS_ENQUEUED_TOTAL: &str = "fio_records_enqueued_total";
    pub const DELIVERIES_TOTAL: &str = "fio_deliveries_total";
    pub const SEND_DURATION_SECONDS: &str = "fio_send_duration_seconds";
    pub const BATCH_SIZE: &str = "fio_batch_size";
}

/// Install the Prometheus exporter and describe all metrics.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::RECORDS_ENQUEUED_TOTAL,
        "Records offered to the local producer queue"
    );
    describe_counter!(
        names::DELIVERIES_TOTAL,
        "Delivery reports received from the broker client"
    );
    describe_histogram!(
        names::SEND_DURATION_SECONDS,
        "Time to serialize and enqueue one record, in seconds"
    );
    describe_histogram!(names::BATCH_SIZE, "Records per list submission");

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

pub fn record_enqueue(topic: &str, status: &'static str) {
    counter!(names::RECORDS_ENQUEUED_TOTAL, "topic" => topic.to_string(), "status" => status)
        .increment(1);
}

pub fn record_delivery(topic: &str, outcome: &'static str) {
    counter!(names::DELIVERIES_TOTAL, "topic" => topic.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_send_duration(topic: &str, duration_secs: f64) {
    histogram!(names::SEND_DURATION_SECONDS, "topic" => topic.to_string()).record(duration_secs);
}

pub fn record_batch_size(size: usize) {
    histogram!(names::BATCH_SIZE).record(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    // These only verify recording doesn't panic without an exporter.

    #[test]
    fn test_record_enqueue() {
        record_enqueue("fio", "accepted");
        record_enqueue("fio", "rejected");
    }

    #[test]
    fn test_record_delivery() {
        record_delivery("fio", "delivered");
        record_delivery("fio", "failed");
    }

    #[test]
    fn test_record_histograms() {
        record_send_duration("fio", 0.001);
        record_batch_size(10);
    }
}
