use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::producer::StatsSnapshot;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` while the producer accepts sends, `closing` once shutdown began
    pub status: String,
    /// Topic every record is produced to
    pub topic: String,
    /// Whether the delivery report loop is still draining events
    pub delivery_loop_running: bool,
    /// Pipeline counters since startup
    pub deliveries: DeliveryStatsResponse,
    /// Service version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

/// Delivery counters as reported by `/health`.
#[derive(Debug, Serialize)]
pub struct DeliveryStatsResponse {
    /// Sends accepted into the local queue
    pub enqueued: u64,
    /// Broker-acknowledged deliveries
    pub delivered: u64,
    /// Deliveries the broker client gave up on
    pub failed: u64,
    /// Accepted sends with no delivery report yet
    pub in_flight: u64,
}

impl From<StatsSnapshot> for DeliveryStatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            enqueued: snapshot.enqueued,
            delivered: snapshot.delivered,
            failed: snapshot.failed,
            in_flight: snapshot.in_flight(),
        }
    }
}
