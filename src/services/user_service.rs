// src/services/user_service.rs
use crate::{
    config::BootstrapAccount,
    error::{AppError, AppResult},
    models::user::{Role, User, UserProfile},
    services::auth_service,
};
use sqlx::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, full_name, password_hash, created_at";

pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by id: {}", user_id);
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by email: {}", email);
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
    ))
    .bind(email.trim())
    .fetch_optional(db_pool)
    .await?;
    Ok(user)
}

/// Roles held by a user. Unknown role strings in the table are skipped.
pub async fn get_user_roles(db_pool: &SqlitePool, user_id: &str) -> AppResult<Vec<Role>> {
    let raw: Vec<String> =
        sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ?1 ORDER BY role ASC")
            .bind(user_id)
            .fetch_all(db_pool)
            .await?;

    let roles = raw
        .iter()
        .filter_map(|r| match r.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!("Ignoring role of user {}: {}", user_id, e);
                None
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!("Roles of {}: {:?}", user_id, roles);
    Ok(roles)
}

pub async fn user_profile(db_pool: &SqlitePool, user_id: &str) -> AppResult<UserProfile> {
    let user = find_user_by_id(db_pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id}")))?;
    let roles = get_user_roles(db_pool, user_id).await?;
    Ok(UserProfile {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        roles,
    })
}

/// Creates an account with its roles in one transaction. Returns the new id.
pub async fn create_user(
    db_pool: &SqlitePool,
    email: &str,
    full_name: &str,
    raw_password: &str,
    roles: &[Role],
) -> AppResult<String> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidRequest("A valid email is required".into()));
    }
    if raw_password.len() < 8 {
        return Err(AppError::InvalidRequest("Password must have at least 8 characters".into()));
    }
    if roles.is_empty() {
        return Err(AppError::InvalidRequest("At least one role is required".into()));
    }
    tracing::info!("Creating user {}", email);

    let password_hash = auth_service::hash_password(raw_password).await?;
    let id = Uuid::new_v4().to_string();

    let mut tx = db_pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO users (id, email, full_name, password_hash) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&id)
    .bind(email)
    .bind(full_name.trim())
    .bind(&password_hash)
    .execute(&mut *tx)
    .await;

    if let Err(sqlx::Error::Database(db_err)) = &inserted {
        if db_err.is_unique_violation() {
            tracing::warn!("User {} already exists", email);
            return Err(AppError::InvalidRequest(format!("Email '{email}' is already in use")));
        }
    }
    inserted?;

    for role in roles {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)")
            .bind(&id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!("User {} created with id {}", email, id);
    Ok(id)
}

/// Replaces every role of a user.
pub async fn set_user_roles(db_pool: &SqlitePool, user_id: &str, roles: &[Role]) -> AppResult<()> {
    tracing::info!("Setting roles of {} to {:?}", user_id, roles);
    let mut tx = db_pool.begin().await?;

    sqlx::query("DELETE FROM user_roles WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for role in roles {
        sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Seeds the first coordinator so a fresh database can be administered.
pub async fn ensure_bootstrap_coordinator(
    db_pool: &SqlitePool,
    account: &BootstrapAccount,
) -> AppResult<()> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role = 'coordinator'")
            .fetch_one(db_pool)
            .await?;
    if existing > 0 {
        tracing::debug!("Coordinator already present, skipping bootstrap");
        return Ok(());
    }

    create_user(
        db_pool,
        &account.email,
        "Coordinator",
        &account.password,
        &[Role::Coordinator],
    )
    .await?;
    tracing::info!("Bootstrap coordinator {} created", account.email);
    Ok(())
}
