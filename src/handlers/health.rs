//! Health endpoint.
//!
//! Always returns 200; the body reports whether the producer still accepts
//! sends and how many deliveries are outstanding.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "topic": "fio",
///   "delivery_loop_running": true,
///   "deliveries": { "enqueued": 12, "delivered": 11, "failed": 0, "in_flight": 1 },
///   "version": "0.1.0",
///   "uptime_seconds": 42,
///   "timestamp": "2024-01-15T10:30:00Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let producer = state.producer();

    Json(HealthResponse {
        status: if producer.is_closed() {
            "closing"
        } else {
            "healthy"
        }
        .to_string(),
        topic: producer.topic().to_string(),
        delivery_loop_running: producer.delivery_loop_running(),
        deliveries: producer.stats().into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: Utc::now(),
    })
}
