//! HTTP middleware.
//!
//! - **Request ID**: every request and response carries `X-Request-Id`, so a
//!   "Failed to send" response can be matched to its server-side log line

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer};
