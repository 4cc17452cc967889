use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Manual driver is incomplete, missing: {}", .0.join(", "))]
    IncompleteManualDriver(Vec<String>),

    #[error("Driver {0} is not an active driver")]
    NoActiveDriver(Uuid),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("External collaborator failed: {0}")]
    ExternalCollaborator(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::IncompleteManualDriver(_) => "INCOMPLETE_MANUAL_DRIVER",
            AppError::NoActiveDriver(_) => "NO_ACTIVE_DRIVER",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::ExternalCollaborator(_) => "EXTERNAL_COLLABORATOR_ERROR",
            AppError::Database(_) => "DB_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::IncompleteManualDriver(_)
            | AppError::NoActiveDriver(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidState(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalCollaborator(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let details = match &self {
            AppError::Validation(errors) | AppError::IncompleteManualDriver(errors) => {
                Some(errors.clone())
            }
            _ => None,
        };

        // Database internals stay in the logs
        let message = match &self {
            AppError::Database(_) => "An error occurred while accessing the database".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: self.code(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}
