//! Request handlers for `/counter` and `/ping`.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use tokio::time::Instant;

use hitcounter_core::error::{ClientCode, HitCounterError};

use crate::app_state::AppState;
use crate::transport::codec::{encode_png, CONTENT_DISPOSITION, PNG_CONTENT_TYPE};

/// Body message for every user-visible failure. Causes go to the log only.
pub const FAILURE_MESSAGE: &str = "Failed to generate of image.";

pub async fn counter(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let metrics = state.metrics();

    let outcome = match state.counter().next().await {
        Ok(rendered) => encode_png(&rendered.image).map(|png| (rendered.count, png)),
        Err(e) => Err(e),
    };

    let code = match &outcome {
        Ok(_) => "ok",
        Err(e) => e.client_code().as_str(),
    };
    metrics.counter_requests.inc(&[("outcome", code)]);
    metrics.counter_duration.observe(&[], started.elapsed());

    match outcome {
        Ok((count, png)) => {
            tracing::debug!(count, bytes = png.len(), "counter served");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, PNG_CONTENT_TYPE),
                    (header::CONTENT_DISPOSITION, CONTENT_DISPOSITION),
                ],
                Bytes::from(png),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, code, "counter request failed");
            failure_response(&e, state.cfg().gateway.strict_errors)
        }
    }
}

/// Legacy mode answers 200 with a JSON message; strict mode maps the error to
/// a 5xx status with the same body.
fn failure_response(err: &HitCounterError, strict: bool) -> Response {
    let status = if !strict {
        StatusCode::OK
    } else {
        match err.client_code() {
            ClientCode::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ClientCode::BadRequest | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    };
    (status, Json(json!({ "message": FAILURE_MESSAGE }))).into_response()
}

pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}
