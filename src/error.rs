// src/error.rs
use crate::models::registration::ConflictDetail;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Business rules
    #[error("{0} not found")]
    NotFound(String),

    #[error("Class is full")]
    Capacity,

    #[error("Registration deadline has passed")]
    DeadlinePassed,

    #[error("Time conflict detected")]
    Conflict(Vec<ConflictDetail>),

    #[error("Already registered for this class")]
    AlreadyRegistered,

    #[error("Registration not found")]
    NotRegistered,

    #[error("Already registered for {subject_code} (class {class_id}) in semester {semester}")]
    SubjectAlreadyTaken {
        subject_code: String,
        class_id: i64,
        semester: String,
    },

    #[error("Both classes must be in the same subject")]
    SubjectMismatch,

    #[error("{0}")]
    InvalidRequest(String),

    // Accounts and permissions
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Failed to process password")]
    PasswordHashingError,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not allowed")]
    Forbidden,

    // Wrapped library errors, logged and shown as a generic 500
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Unexpected internal error")]
    InternalServerError,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Capacity
            | AppError::DeadlinePassed
            | AppError::Conflict(_)
            | AppError::AlreadyRegistered
            | AppError::NotRegistered
            | AppError::SubjectAlreadyTaken { .. }
            | AppError::SubjectMismatch => StatusCode::CONFLICT,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::PasswordHashingError
            | AppError::SessionError(_)
            | AppError::SqlxError(_)
            | AppError::SqlxMigrateError(_)
            | AppError::EnvVarError(_)
            | AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client. Infrastructure details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                "Failed to access data.".to_string()
            }
            AppError::EnvVarError(_) => "Configuration error.".to_string(),
            AppError::SessionError(_) => "Failed to manage your session.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let mut body = json!({
            "success": false,
            "error": self.user_message(),
        });
        if let AppError::Conflict(conflicts) = &self {
            body["conflicts"] = json!(conflicts);
        }

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_are_conflicts() {
        assert_eq!(AppError::Capacity.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotRegistered.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::NotFound("Class".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn database_details_are_not_leaked() {
        let err = AppError::SqlxError(sqlx::Error::RowNotFound);
        assert_eq!(err.user_message(), "Failed to access data.");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
