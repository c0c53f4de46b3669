// src/web/session_handlers.rs
use crate::{
    error::AppResult,
    models::{
        class::{Class, CreateClassPayload},
        session::{Session, SessionStatus},
    },
    services::session_service,
    state::AppState,
    web::{mw_auth::CurrentUser, response::ApiResponse},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CreatedClass {
    pub class: Class,
    pub sessions: Vec<Session>,
}

// POST /classes
pub async fn create_class(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateClassPayload>,
) -> AppResult<impl IntoResponse> {
    // Tutor assignment and slot validation live in the service
    let (class, sessions) =
        session_service::create_class(&state.db_pool, &user.id, &user.roles, payload).await?;
    Ok(ApiResponse::created(CreatedClass { class, sessions }))
}

// POST /classes/{class_id}/sessions/{session_id}/complete
pub async fn complete_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((class_id, session_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<Session>>> {
    change_status(&state, &user, class_id, session_id, SessionStatus::Completed).await
}

// POST /classes/{class_id}/sessions/{session_id}/cancel
pub async fn cancel_session(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((class_id, session_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<Session>>> {
    change_status(&state, &user, class_id, session_id, SessionStatus::Cancelled).await
}

async fn change_status(
    state: &AppState,
    user: &CurrentUser,
    class_id: i64,
    session_id: i64,
    status: SessionStatus,
) -> AppResult<Json<ApiResponse<Session>>> {
    let session = session_service::set_session_status(
        &state.db_pool,
        &user.id,
        &user.roles,
        class_id,
        session_id,
        status,
    )
    .await?;
    Ok(ApiResponse::ok(session))
}
