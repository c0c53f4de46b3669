// src/web/user_handlers.rs
use crate::{
    error::AppResult,
    models::user::CreateUserPayload,
    services::user_service,
    state::AppState,
    web::{mw_auth::CurrentUser, response::ApiResponse},
};
use axum::{extract::State, response::IntoResponse, Extension, Json};

// POST /users (coordinator)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateUserPayload>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("{} creates account {} with {:?}", user.id, payload.email, payload.roles);
    let id = user_service::create_user(
        &state.db_pool,
        &payload.email,
        &payload.full_name,
        &payload.password,
        &payload.roles,
    )
    .await?;
    let profile = user_service::user_profile(&state.db_pool, &id).await?;
    Ok(ApiResponse::created(profile))
}
