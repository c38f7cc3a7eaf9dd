//! API error responses.
//!
//! Every layer's error converts into [`ApiError`], which renders as
//! `{"error": CODE, "message": text}` with the matching status.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use reimburse_core::workflow::WorkflowError;
use reimburse_db::repositories::{ApprovalRuleError, UserError};
use reimburse_shared::AppError;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code, error = %message, "Request failed");
            return Self {
                status,
                code,
                message: "An internal error occurred".to_string(),
            };
        }
        Self {
            status,
            code,
            message,
        }
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.code, "message": self.message })),
        )
            .into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        Self::new(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<ApprovalRuleError> for ApiError {
    fn from(e: ApprovalRuleError) -> Self {
        Self::new(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        Self::new(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self::new(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::new(400, "VALIDATION_ERROR", e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::new(400, "VALIDATION_ERROR", e.body_text())
    }
}
