// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginPayload, UserProfile},
    services::{auth_service, user_service},
    state::AppState,
    web::{
        mw_auth::{CurrentUser, SESSION_USER_KEY},
        response::ApiResponse,
    },
};
use axum::{extract::State, Extension, Json};
use tower_sessions::Session;

// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    tracing::info!("Login attempt for {}", payload.email);

    // 1. Same error for unknown email and wrong password
    let user = auth_service::authenticate(&state.db_pool, &payload.email, &payload.password).await?;

    // 2. New session id on every login, then remember who this is
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to rotate id: {e}")))?;
    session
        .insert(SESSION_USER_KEY, &user.id)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to store user: {e}")))?;

    // 3. Profile with roles, so the client knows which screens to offer
    let profile = user_service::user_profile(&state.db_pool, &user.id).await?;
    tracing::info!("Login succeeded for {}", user.id);
    Ok(ApiResponse::with_message(profile, "Logged in"))
}

// POST /auth/logout
pub async fn handle_logout(session: Session) -> AppResult<Json<ApiResponse<()>>> {
    // Read before deleting, only for the log line
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to delete session: {e}")))?;

    match user_id {
        Some(id) => tracing::info!("User '{}' logged out", id),
        None => tracing::info!("Anonymous session logged out"),
    }
    Ok(ApiResponse::with_message((), "Logged out"))
}

// GET /auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = user_service::user_profile(&state.db_pool, &user.id).await?;
    Ok(ApiResponse::ok(profile))
}
