// src/db.rs
use crate::error::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool(database_url: &str) -> AppResult<SqlitePool> {
    tracing::info!("Connecting to database: {}", database_url);

    // Foreign keys are off by default in SQLite; busy_timeout lets writers queue
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Applies every file in ./migrations not yet recorded
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations finished.");

    Ok(pool)
}

/// Takes the SQLite write lock as the first statement of a transaction.
///
/// A transaction that only reads first and writes later can interleave with
/// another writer; claiming the lock up front makes concurrent mutations run
/// one after the other, so each one validates against committed state.
pub async fn claim_write_lock(conn: &mut SqliteConnection, class_id: i64) -> AppResult<()> {
    sqlx::query("UPDATE classes SET current_enrolled = current_enrolled WHERE id = ?1")
        .bind(class_id)
        .execute(conn)
        .await?;
    Ok(())
}
