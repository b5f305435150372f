//! API handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::AppState;
use crate::complaints::{self, ComplaintDraft, ComplaintError};

/// Canned reply of the liveness probe and the `/api` catch-all.
pub const API_STATUS_MESSAGE: &str = "API funcionando!";

/// JSON envelope used by every response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness probe
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new(API_STATUS_MESSAGE))
}

/// Catch-all under the `/api` prefix, any method.
pub async fn api_status() -> Json<MessageResponse> {
    Json(MessageResponse::new(API_STATUS_MESSAGE))
}

/// Create a complaint
pub async fn create_complaint(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<MessageResponse>, ApiError> {
    let receipt = complaints::submit(state.intake.as_ref(), ComplaintDraft { body })
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Error creating complaint");
            ApiError::from(err)
        })?;

    Ok(Json(MessageResponse::new(receipt.message)))
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl From<ComplaintError> for ApiError {
    fn from(err: ComplaintError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(MessageResponse::new(self.message))).into_response()
    }
}
