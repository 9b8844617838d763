//! Request ID propagation.
//!
//! An incoming `X-Request-Id` is kept as-is; otherwise a UUIDv4 is assigned.
//! The ID is written back on the request (for handlers) and on the response.
//!
//! ```bash
//! curl -H "X-Request-Id: batch-42" -d '[...]' http://localhost:8080/send-fio/list
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::{Request, Response};
use tower::{Layer, Service};
use tracing::debug;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Default)]
pub struct RequestIdLayer;

impl RequestIdLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let request_id = request_id_for(&req);
        debug!(request_id = ?request_id, method = %req.method(), uri = %req.uri(), "Request received");
        req.headers_mut().insert(REQUEST_ID_HEADER, request_id.clone());

        // Take the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
            Ok(response)
        })
    }
}

/// Reuse a non-empty incoming ID, otherwise generate one.
fn request_id_for<B>(req: &Request<B>) -> HeaderValue {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(generate_request_id)
}

fn generate_request_id() -> HeaderValue {
    // A hyphenated UUID is always a valid header value
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}
