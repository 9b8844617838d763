//! # FIO Producer
//!
//! HTTP front door for a Kafka topic. Clients post FIO records (surname,
//! first name, last name) one at a time or as a list; each record is
//! serialized to JSON and handed to librdkafka, which delivers it
//! asynchronously. Delivery outcomes are reported by a background task.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → CORS → Body limit)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (records, health, swagger)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RequestService                                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ProducerHandle ──► Transport (librdkafka)                  │
//! │        ▲                    │ delivery callbacks            │
//! │        └── DeliveryReportLoop ◄─┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fio_producer::{AppState, Config, ProducerHandle, build_router, load_broker_config};
//!
//! #[tokio::main]
//! async fn main() -> fio_producer::AppResult<()> {
//!     let config = Config::from_env()?;
//!     let broker = load_broker_config(&config.kafka_config_path)?;
//!     let producer = ProducerHandle::open(&config.kafka_topic, &broker)?;
//!
//!     let state = AppState::new(producer, config);
//!     let app = build_router(state.clone());
//!
//!     // Serve `app`, then:
//!     state.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod broker_config;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod producer;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use broker_config::{ConfigMap, load_broker_config};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::Record;
pub use producer::{DeliveryEvent, ProducerHandle, Transport};
pub use routes::build_router;
pub use services::RequestService;
pub use state::AppState;
