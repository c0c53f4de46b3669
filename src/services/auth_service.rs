// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
    services::user_service,
};
use sqlx::SqlitePool;

/// Checks a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &stored_hash))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking failed (verify_password): {:?}", e);
            AppError::InternalServerError
        })?
        .map_err(|e| {
            tracing::error!("bcrypt verify failed: {:?}", e);
            AppError::PasswordHashingError
        })
}

pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking failed (hash_password): {:?}", e);
            AppError::InternalServerError
        })?
        .map_err(|e| {
            tracing::error!("bcrypt hash failed: {:?}", e);
            AppError::PasswordHashingError
        })
}

/// Resolves email + password to a user. Unknown email and wrong password
/// give the same error.
pub async fn authenticate(db_pool: &SqlitePool, email: &str, password: &str) -> AppResult<User> {
    let Some(user) = user_service::find_user_by_email(db_pool, email).await? else {
        tracing::warn!("Login for unknown email {}", email);
        return Err(AppError::InvalidCredentials);
    };

    if verify_password(password, &user.password_hash).await? {
        Ok(user)
    } else {
        tracing::warn!("Wrong password for {}", email);
        Err(AppError::InvalidCredentials)
    }
}
