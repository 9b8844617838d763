//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Adds X-Request-Id header
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Cross-origin headers
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Body limit     │ ← 413 above MAX_REQUEST_BODY_SIZE
//! └────────┬─────────┘
//!          ▼
//!      Handler
//! ```
//!
//! # Routes
//!
//! - `GET /` - Welcome text
//! - `POST /send-fio`, `POST /send-fio/list` - Record submission
//! - `GET /swagger/*` - API documentation
//! - `GET /health` - Producer status

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::RequestIdLayer;
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let cors = build_cors_layer(&config.cors_allowed_origins);

    info!(
        max_body_bytes = config.max_request_body_size,
        batch_max_size = config.batch_max_size,
        "Request limits configured"
    );

    Router::new()
        .route("/", get(handlers::welcome))
        .route("/send-fio", post(handlers::send_record))
        .route("/send-fio/list", post(handlers::send_record_list))
        .route("/swagger", get(handlers::swagger_index))
        .route("/swagger/{*path}", get(handlers::swagger))
        .route("/health", get(handlers::health_check))
        // Applied bottom to top: the last layer sees the request first
        .layer(DefaultBodyLimit::max(config.max_request_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
        .with_state(state)
}

/// Build CORS layer from the allowed origins, `["*"]` meaning any origin.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    let cors = if allow_any {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods(Any).allow_headers(Any)
}
