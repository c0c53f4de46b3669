// src/models/class.rs
use crate::error::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Period 1 starts at 06:00; one period per hour.
pub const FIRST_PERIOD: i64 = 1;
pub const LAST_PERIOD: i64 = 17;
const FIRST_PERIOD_HOUR: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ClassStatus {
    Open,
    Closed,
    Cancelled,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Open => "open",
            ClassStatus::Closed => "closed",
            ClassStatus::Cancelled => "cancelled",
        }
    }
}

/// Row of the `classes` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub subject_id: i64,
    pub tutor_id: String,
    pub location: Option<String>,
    pub capacity: i64,
    pub current_enrolled: i64,
    pub week_day: i64,
    pub start_period: i64,
    pub end_period: i64,
    pub semester: String,
    pub num_of_weeks: i64,
    pub start_date: Option<NaiveDate>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub status: ClassStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Class {
    pub fn time_slot(&self) -> TimeSlot {
        TimeSlot {
            week_day: self.week_day,
            start_period: self.start_period,
            end_period: self.end_period,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_enrolled >= self.capacity
    }

    /// A class without a deadline never closes for registration.
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.registration_deadline.is_some_and(|deadline| deadline <= now)
    }
}

/// Qualified column list for `Class`, usable in joins.
pub const CLASS_COLUMNS: &str = "c.id AS id, c.subject_id AS subject_id, c.tutor_id AS tutor_id, \
     c.location AS location, c.capacity AS capacity, c.current_enrolled AS current_enrolled, \
     c.week_day AS week_day, c.start_period AS start_period, c.end_period AS end_period, \
     c.semester AS semester, c.num_of_weeks AS num_of_weeks, c.start_date AS start_date, \
     c.registration_deadline AS registration_deadline, c.status AS status, \
     c.created_at AS created_at";

/// A class joined with its subject and tutor, as shown in the catalog.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    pub subject_name: String,
    pub subject_code: String,
    pub tutor_name: Option<String>,
}

/// Classes of one subject, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectGroup {
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub classes: Vec<ClassListing>,
}

/// Weekly recurring meeting window: `[start_period, end_period)` on `week_day`
/// (1 = Monday .. 7 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub week_day: i64,
    pub start_period: i64,
    pub end_period: i64,
}

impl TimeSlot {
    pub fn new(week_day: i64, start_period: i64, end_period: i64) -> AppResult<Self> {
        if !(1..=7).contains(&week_day) {
            return Err(AppError::InvalidRequest(format!(
                "week_day must be between 1 and 7, got {week_day}"
            )));
        }
        if start_period < FIRST_PERIOD || end_period > LAST_PERIOD + 1 {
            return Err(AppError::InvalidRequest(format!(
                "periods must lie within {FIRST_PERIOD}..={LAST_PERIOD}"
            )));
        }
        if start_period >= end_period {
            return Err(AppError::InvalidRequest(format!(
                "start_period ({start_period}) must be before end_period ({end_period})"
            )));
        }
        Ok(Self {
            week_day,
            start_period,
            end_period,
        })
    }

    /// Half-open interval overlap on the same weekday.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.week_day == other.week_day
            && self.start_period < other.end_period
            && other.start_period < self.end_period
    }

    pub fn start_hour(&self) -> i64 {
        period_hour(self.start_period)
    }

    pub fn end_hour(&self) -> i64 {
        period_hour(self.end_period)
    }
}

pub fn period_hour(period: i64) -> i64 {
    period - FIRST_PERIOD + FIRST_PERIOD_HOUR
}

pub fn weekday_name(week_day: i64) -> &'static str {
    match week_day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown",
    }
}

/// Body of `POST /classes`.
#[derive(Debug, Deserialize)]
pub struct CreateClassPayload {
    pub subject_id: i64,
    /// Coordinators may assign any tutor; tutors always create for themselves.
    pub tutor_id: Option<String>,
    pub location: Option<String>,
    pub capacity: i64,
    pub week_day: i64,
    pub start_period: i64,
    pub end_period: i64,
    pub semester: String,
    pub num_of_weeks: i64,
    pub start_date: NaiveDate,
    pub registration_deadline: Option<DateTime<Utc>>,
}

/// Query string of `GET /classes`.
#[derive(Debug, Default, Deserialize)]
pub struct ClassFilter {
    pub subject_id: Option<i64>,
    pub tutor_id: Option<String>,
    pub status: Option<ClassStatus>,
}
