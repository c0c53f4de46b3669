// src/models/session.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

/// Row of the `sessions` table: one dated meeting of a class.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub class_id: i64,
    pub week_number: i64,
    pub session_date: NaiveDate,
    pub start_period: i64,
    pub end_period: i64,
    pub status: SessionStatus,
}

/// A session not yet written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub week_number: i64,
    pub session_date: NaiveDate,
    pub start_period: i64,
    pub end_period: i64,
}
