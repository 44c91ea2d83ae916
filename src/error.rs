use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::models::WizardError;
use crate::services::ImageError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Wizard session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Wizard(#[from] WizardError),

    #[error("{0}")]
    Image(#[from] ImageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Wizard(WizardError::TemperatureOutOfRange { .. })
            | AppError::Wizard(WizardError::StyleNotOffered { .. }) => StatusCode::BAD_REQUEST,
            AppError::Wizard(_) => StatusCode::CONFLICT,
            AppError::Image(ImageError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Image(ImageError::InvalidReference(_)) => StatusCode::BAD_REQUEST,
            AppError::Image(ImageError::Read { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
