// src/web/schedule_handlers.rs
use crate::{
    error::{AppError, AppResult},
    services::{registration_service, user_service},
    state::AppState,
    templates::SchedulePage,
    web::mw_auth::CurrentUser,
};
use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Extension,
};

// GET /schedule
pub async fn schedule_page(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!("GET /schedule for {}", user.id);

    let profile = user_service::user_profile(&state.db_pool, &user.id).await?;
    let registrations = registration_service::registrations_by_mentee(&state.db_pool, &user.id).await?;

    // The grid is computed in Rust; the template only loops
    let template = SchedulePage::build(profile.full_name, &registrations);
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render schedule template: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}
