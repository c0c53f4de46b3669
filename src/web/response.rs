// src/web/response.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Success envelope. Failures are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message.into()),
        })
    }

    pub fn created(data: T) -> impl IntoResponse {
        (StatusCode::CREATED, Self::ok(data))
    }
}
