//! Shared application state for Axum handlers.
//!
//! # Ownership
//!
//! The producer handle is created by `main` and moved in here. Handlers
//! reach it through `RequestService`; only `main` calls [`AppState::shutdown`],
//! after the HTTP server has stopped accepting requests.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::producer::ProducerHandle;
use crate::services::RequestService;

/// Shared application state for Axum handlers.
///
/// Cloned for each request; all internal data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record submission façade over the producer
    pub service: RequestService,
    /// Timestamp when the application started
    pub started_at: Instant,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(producer: ProducerHandle, config: Config) -> Self {
        Self {
            service: RequestService::new(producer),
            started_at: Instant::now(),
            config: Arc::new(config),
        }
    }

    pub fn producer(&self) -> &ProducerHandle {
        self.service.producer()
    }

    /// Flush and close the producer, waiting for the delivery loop to exit.
    pub async fn shutdown(&self) {
        self.producer()
            .shutdown_with_timeout(self.config.shutdown_flush_timeout)
            .await;
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
