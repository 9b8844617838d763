//! Record submission handlers.
//!
//! # Endpoints
//!
//! - `GET /` - Plain-text welcome
//! - `POST /send-fio` - Enqueue one record
//! - `POST /send-fio/list` - Enqueue records in order, stopping at the first failure
//!
//! A 200 means "accepted for sending". Delivery is confirmed later, out of
//! band, and only shows up in the logs.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::models::Record;
use crate::state::AppState;
use crate::validation::validate_batch_size;

/// Body-limit rejections keep their 413; every other rejection is invalid data.
fn body_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(rejection.body_text())
    } else {
        AppError::InvalidData(rejection.body_text())
    }
}

pub async fn welcome() -> &'static str {
    info!("Handle welcome");
    "Welcome"
}

/// Send a single record.
///
/// # Request Body
///
/// ```json
/// { "surname": "Ivanov", "first_name": "Ivan", "last_name": "Ivanovich" }
/// ```
///
/// Echoes the parsed record on success.
#[instrument(skip_all)]
pub async fn send_record(
    State(state): State<AppState>,
    payload: Result<Json<Record>, JsonRejection>,
) -> AppResult<Json<Record>> {
    let Json(record) = payload.map_err(body_rejection)?;

    state.service.produce(&record)?;

    Ok(Json(record))
}

/// Send a list of records.
///
/// Records are enqueued one by one in the given order. The first enqueue
/// failure aborts the rest and turns the whole response into a 400, even
/// though earlier records were already accepted.
#[instrument(skip_all)]
pub async fn send_record_list(
    State(state): State<AppState>,
    payload: Result<Json<Vec<Record>>, JsonRejection>,
) -> AppResult<Json<Vec<Record>>> {
    let Json(records) = payload.map_err(body_rejection)?;

    validate_batch_size(records.len(), state.config.batch_max_size)?;

    state.service.produce_all(&records)?;

    Ok(Json(records))
}
