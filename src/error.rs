use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Status and message of a failed request, left in the response extensions so the
/// envelope middleware can add the request details.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Timeout(_)
            | AppError::Internal(_)
            | AppError::Bcrypt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                e.to_string()
            }
            AppError::Timeout(ref message) => {
                tracing::error!("Store call timed out: {}", message);
                self.to_string()
            }
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                message.clone()
            }
            AppError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                e.to_string()
            }
            AppError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                "no valid jwt provided".to_string()
            }
            AppError::Validation(ref message)
            | AppError::BadRequest(ref message)
            | AppError::Authentication(ref message)
            | AppError::Authorization(ref message)
            | AppError::NotFound(ref message)
            | AppError::Conflict(ref message) => message.clone(),
        };

        let detail = ErrorDetail {
            code: status.as_u16(),
            message: message.clone(),
        };

        let body = Json(json!({
            "code": status.as_u16(),
            "message": message,
        }));

        let mut response = (status, body).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Malformed request bodies are client validation errors, never 422
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

// Validation helper
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        error_messages.sort();

        AppError::Validation(error_messages.join(", "))
    }
}
