// src/web/catalog_handlers.rs
use crate::{
    error::AppResult,
    models::{
        class::{ClassFilter, ClassListing, SubjectGroup},
        session::Session,
        subject::{CreateSubjectPayload, Subject},
    },
    services::{catalog_service, session_service},
    state::AppState,
    web::{mw_auth::CurrentUser, response::ApiResponse},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};

// GET /subjects
pub async fn list_subjects(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Subject>>>> {
    let subjects = catalog_service::list_subjects(&state.db_pool).await?;
    Ok(ApiResponse::ok(subjects))
}

// GET /subjects/{id}
pub async fn get_subject(
    State(state): State<AppState>,
    Path(subject_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Subject>>> {
    let subject = catalog_service::get_subject(&state.db_pool, subject_id).await?;
    Ok(ApiResponse::ok(subject))
}

// POST /subjects (coordinator)
pub async fn create_subject(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateSubjectPayload>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("{} creates subject {}", user.id, payload.code);
    let subject = catalog_service::create_subject(&state.db_pool, &payload.name, &payload.code).await?;
    Ok(ApiResponse::created(subject))
}

// GET /classes?subject_id=&tutor_id=&status=
pub async fn list_classes(
    State(state): State<AppState>,
    Query(filter): Query<ClassFilter>,
) -> AppResult<Json<ApiResponse<Vec<ClassListing>>>> {
    let classes = catalog_service::list_classes(&state.db_pool, &filter).await?;
    Ok(ApiResponse::ok(classes))
}

// GET /classes/grouped
pub async fn grouped_classes(
    State(state): State<AppState>,
    Query(filter): Query<ClassFilter>,
) -> AppResult<Json<ApiResponse<Vec<SubjectGroup>>>> {
    let groups = catalog_service::grouped_classes(&state.db_pool, &filter).await?;
    Ok(ApiResponse::ok(groups))
}

// GET /classes/{class_id}/sessions
pub async fn class_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(class_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Session>>>> {
    // Tutor, coordinators and registered mentees only
    session_service::ensure_can_view_sessions(&state.db_pool, &user.id, &user.roles, class_id).await?;
    let sessions = catalog_service::sessions_by_class(&state.db_pool, class_id).await?;
    Ok(ApiResponse::ok(sessions))
}
