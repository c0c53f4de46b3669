// src/web/registration_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::registration::{
        CancelPayload, CheckConflictQuery, ClassMentee, ConflictReport, MenteeRegistration,
        RegisterPayload, Registration, ReschedulePayload, RescheduleOutcome,
    },
    services::{registration_service, session_service},
    state::AppState,
    web::{mw_auth::CurrentUser, response::ApiResponse},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;

/// A mentee acts for themselves; coordinators act for anyone.
fn ensure_acts_for(user: &CurrentUser, mentee_id: &str) -> AppResult<()> {
    if user.id == mentee_id || user.is_coordinator() {
        Ok(())
    } else {
        tracing::warn!("{} tried to act for mentee {}", user.id, mentee_id);
        Err(AppError::Forbidden)
    }
}

// POST /registrations/register
pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    // 1. The caller may only register themselves (coordinators anyone)
    ensure_acts_for(&user, &payload.mentee_id)?;
    // 2. All rules run in the service, inside one transaction
    let registration =
        registration_service::register(&state.db_pool, payload.class_id, &payload.mentee_id, Utc::now())
            .await?;
    Ok(ApiResponse::ok(registration))
}

// POST /registrations/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CancelPayload>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    ensure_acts_for(&user, &payload.mentee_id)?;
    // Returns the removed row so the client can show what was dropped
    let removed =
        registration_service::cancel(&state.db_pool, payload.class_id, &payload.mentee_id).await?;
    Ok(ApiResponse::with_message(removed, "Registration cancelled"))
}

// POST /registrations/reschedule
pub async fn reschedule(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ReschedulePayload>,
) -> AppResult<Json<ApiResponse<RescheduleOutcome>>> {
    ensure_acts_for(&user, &payload.mentee_id)?;
    let outcome = registration_service::reschedule(
        &state.db_pool,
        payload.old_class_id,
        payload.new_class_id,
        &payload.mentee_id,
        Utc::now(),
    )
    .await?;
    // Human-readable summary next to the structured outcome
    let message = format!(
        "Moved from class {} to class {}",
        outcome.old_class_id, outcome.new_class_id
    );
    Ok(ApiResponse::with_message(outcome, message))
}

// GET /registrations/check-conflict?mentee_id=&class_id=
pub async fn check_conflict(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<CheckConflictQuery>,
) -> AppResult<Json<ApiResponse<ConflictReport>>> {
    ensure_acts_for(&user, &query.mentee_id)?;
    let report =
        registration_service::check_conflict(&state.db_pool, &query.mentee_id, query.class_id).await?;
    Ok(ApiResponse::ok(report))
}

// GET /registrations/mentee/{mentee_id}
pub async fn mentee_registrations(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(mentee_id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<MenteeRegistration>>>> {
    ensure_acts_for(&user, &mentee_id)?;
    let rows = registration_service::registrations_by_mentee(&state.db_pool, &mentee_id).await?;
    Ok(ApiResponse::ok(rows))
}

// GET /registrations/class/{class_id}/mentees (tutor or coordinator)
pub async fn class_mentees(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(class_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<ClassMentee>>>> {
    // The route layer only checks the role; ownership of the class is checked here
    session_service::ensure_class_staff(&state.db_pool, &user.id, &user.roles, class_id).await?;
    let mentees = registration_service::mentees_by_class(&state.db_pool, class_id).await?;
    Ok(ApiResponse::ok(mentees))
}
