// src/models/registration.rs
use crate::models::class::ClassListing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of `class_registrations`; keyed by (class_id, mentee_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub class_id: i64,
    pub mentee_id: String,
    pub registration_log: DateTime<Utc>,
}

/// One collision between the candidate class and a class the mentee already holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConflictDetail {
    pub conflicting_class_id: i64,
    pub conflicting_subject_id: i64,
    pub week_day: i64,
    pub semester: String,
    pub conflicting_start_period: i64,
    pub conflicting_end_period: i64,
    pub new_class_id: i64,
    pub new_start_period: i64,
    pub new_end_period: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicts: Vec<ConflictDetail>,
}

impl From<Vec<ConflictDetail>> for ConflictReport {
    fn from(conflicts: Vec<ConflictDetail>) -> Self {
        Self {
            has_conflict: !conflicts.is_empty(),
            conflicts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RescheduleOutcome {
    pub old_class_id: i64,
    pub new_class_id: i64,
    pub mentee_id: String,
    pub rescheduled_at: DateTime<Utc>,
}

/// A registration together with the class it points at.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MenteeRegistration {
    pub registration_log: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub listing: ClassListing,
}

/// A mentee enrolled in a class, as seen by its tutor.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassMentee {
    pub mentee_id: String,
    pub full_name: String,
    pub email: String,
    pub registration_log: DateTime<Utc>,
}

// Request bodies

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub class_id: i64,
    pub mentee_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelPayload {
    pub class_id: i64,
    pub mentee_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReschedulePayload {
    pub old_class_id: i64,
    pub new_class_id: i64,
    pub mentee_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckConflictQuery {
    pub mentee_id: String,
    pub class_id: i64,
}
