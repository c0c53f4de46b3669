// src/models/subject.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `subjects` table. Reference data, never edited after creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /subjects`.
#[derive(Debug, Deserialize)]
pub struct CreateSubjectPayload {
    pub name: String,
    pub code: String,
}
