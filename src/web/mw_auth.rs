// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::user::Role,
    services::user_service,
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

pub const SESSION_USER_KEY: &str = "user_id";

/// The signed-in user, put in the request extensions by `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_coordinator(&self) -> bool {
        self.has_role(Role::Coordinator)
    }
}

/// Rejects requests without a logged-in session with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            AppError::SessionError(format!("Failed to read session: {e}"))
        })?
        .ok_or_else(|| {
            tracing::debug!("Auth MW: no user in session");
            AppError::Unauthorized
        })?;

    // The account may have been removed since login
    if user_service::find_user_by_id(&state.db_pool, &user_id).await?.is_none() {
        tracing::warn!("Auth MW: session points to missing user {}", user_id);
        return Err(AppError::Unauthorized);
    }
    // Roles are read on every request so changes apply without a new login
    let roles = user_service::get_user_roles(&state.db_pool, &user_id).await?;
    tracing::debug!("Auth MW: user '{}' authenticated with {:?}", user_id, roles);

    // Handlers and role middleware read this instead of the session
    request.extensions_mut().insert(CurrentUser { id: user_id, roles });
    Ok(next.run(request).await)
}
