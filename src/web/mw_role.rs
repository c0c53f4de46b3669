// src/web/mw_role.rs
use crate::{error::AppError, models::user::Role, web::mw_auth::CurrentUser};
use axum::{extract::Request, middleware::Next, response::Response, Extension};

pub const CLASS_MANAGER_ROLES: &[Role] = &[Role::Tutor, Role::Coordinator];

/// Runs after `require_auth`. Lets tutors and coordinators through.
pub async fn require_tutor_or_coordinator(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if CLASS_MANAGER_ROLES.iter().any(|r| user.has_role(*r)) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Role MW: {} lacks any of {:?}", user.id, CLASS_MANAGER_ROLES);
        Err(AppError::Forbidden)
    }
}

/// Runs after `require_auth`. Coordinators only.
pub async fn require_coordinator(
    Extension(user): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if user.is_coordinator() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Role MW: {} is not a coordinator", user.id);
        Err(AppError::Forbidden)
    }
}
