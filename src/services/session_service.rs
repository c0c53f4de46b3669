// src/services/session_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        class::{Class, CreateClassPayload, TimeSlot},
        session::{NewSession, Session, SessionStatus},
        user::Role,
    },
    services::{registration_service, user_service},
};
use chrono::{Datelike, Duration, NaiveDate};
use sqlx::SqlitePool;

/// Longest class run accepted, one semester of weekly meetings.
pub const MAX_WEEKS: i64 = 16;

/// Dated sessions for a weekly slot: one per week for `num_of_weeks` weeks,
/// starting at the first matching weekday on or after `first_date`.
pub fn generate_sessions(
    slot: &TimeSlot,
    num_of_weeks: i64,
    first_date: NaiveDate,
) -> AppResult<Vec<NewSession>> {
    let out_of_range = || AppError::InvalidRequest(format!("start_date {first_date} is out of range"));

    let offset = (slot.week_day - i64::from(first_date.weekday().number_from_monday())).rem_euclid(7);
    let first = first_date
        .checked_add_signed(Duration::days(offset))
        .ok_or_else(out_of_range)?;

    (0..num_of_weeks.max(0))
        .map(|week| {
            let session_date = first
                .checked_add_signed(Duration::weeks(week))
                .ok_or_else(out_of_range)?;
            Ok(NewSession {
                week_number: week + 1,
                session_date,
                start_period: slot.start_period,
                end_period: slot.end_period,
            })
        })
        .collect()
}

/// Creates a class and its generated sessions in one transaction.
///
/// Tutors always create classes for themselves; coordinators must name the tutor.
pub async fn create_class(
    pool: &SqlitePool,
    caller_id: &str,
    caller_roles: &[Role],
    payload: CreateClassPayload,
) -> AppResult<(Class, Vec<Session>)> {
    // 1. Validation
    let slot = TimeSlot::new(payload.week_day, payload.start_period, payload.end_period)?;
    if payload.capacity < 1 {
        return Err(AppError::InvalidRequest("capacity must be at least 1".into()));
    }
    if !(1..=MAX_WEEKS).contains(&payload.num_of_weeks) {
        return Err(AppError::InvalidRequest(format!(
            "num_of_weeks must be between 1 and {MAX_WEEKS}"
        )));
    }
    // Dates are checked before anything is written
    let planned = generate_sessions(&slot, payload.num_of_weeks, payload.start_date)?;
    if payload.semester.trim().is_empty() {
        return Err(AppError::InvalidRequest("semester is required".into()));
    }

    let tutor_id = if caller_roles.contains(&Role::Coordinator) {
        payload
            .tutor_id
            .clone()
            .ok_or_else(|| AppError::InvalidRequest("tutor_id is required".into()))?
    } else {
        match &payload.tutor_id {
            Some(requested) if requested != caller_id => return Err(AppError::Forbidden),
            _ => caller_id.to_string(),
        }
    };
    let tutor_roles = user_service::get_user_roles(pool, &tutor_id).await?;
    if !tutor_roles.contains(&Role::Tutor) {
        return Err(AppError::InvalidRequest(format!("user {tutor_id} is not a tutor")));
    }

    let mut tx = pool.begin().await?;

    let subject_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1)")
        .bind(payload.subject_id)
        .fetch_one(&mut *tx)
        .await?;
    if !subject_exists {
        return Err(AppError::NotFound(format!("Subject {}", payload.subject_id)));
    }

    // 2. Class row
    let class_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO classes (subject_id, tutor_id, location, capacity, current_enrolled,
                             week_day, start_period, end_period, semester, num_of_weeks,
                             start_date, registration_deadline, status)
        VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 'open')
        RETURNING id
        "#,
    )
    .bind(payload.subject_id)
    .bind(&tutor_id)
    .bind(&payload.location)
    .bind(payload.capacity)
    .bind(slot.week_day)
    .bind(slot.start_period)
    .bind(slot.end_period)
    .bind(payload.semester.trim())
    .bind(payload.num_of_weeks)
    .bind(payload.start_date)
    .bind(payload.registration_deadline)
    .fetch_one(&mut *tx)
    .await?;

    // 3. Sessions
    let mut sessions = Vec::with_capacity(planned.len());
    for new in planned {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (class_id, week_number, session_date, start_period, end_period, status)
            VALUES (?1, ?2, ?3, ?4, ?5, 'scheduled')
            RETURNING id, class_id, week_number, session_date, start_period, end_period, status
            "#,
        )
        .bind(class_id)
        .bind(new.week_number)
        .bind(new.session_date)
        .bind(new.start_period)
        .bind(new.end_period)
        .fetch_one(&mut *tx)
        .await?;
        sessions.push(session);
    }

    let class = registration_service::load_class(&mut tx, class_id).await?;
    tx.commit().await?;

    tracing::info!(
        "Class {} created by {} for tutor {} with {} sessions",
        class.id,
        caller_id,
        tutor_id,
        sessions.len()
    );
    Ok((class, sessions))
}

/// Marks a session completed or cancelled. Only the class's tutor or a coordinator may.
pub async fn set_session_status(
    pool: &SqlitePool,
    caller_id: &str,
    caller_roles: &[Role],
    class_id: i64,
    session_id: i64,
    status: SessionStatus,
) -> AppResult<Session> {
    let mut tx = pool.begin().await?;

    let class = registration_service::load_class(&mut tx, class_id).await?;
    if !is_class_staff(&class, caller_id, caller_roles) {
        tracing::warn!("User {} tried to change session {} of class {}", caller_id, session_id, class_id);
        return Err(AppError::Forbidden);
    }

    let current: SessionStatus =
        sqlx::query_scalar("SELECT status FROM sessions WHERE id = ?1 AND class_id = ?2")
            .bind(session_id)
            .bind(class_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {session_id}")))?;

    if current == status {
        return Err(AppError::InvalidRequest(format!(
            "Session is already {}",
            status.as_str()
        )));
    }

    let session = sqlx::query_as::<_, Session>(
        r#"
        UPDATE sessions SET status = ?1
        WHERE id = ?2 AND class_id = ?3
        RETURNING id, class_id, week_number, session_date, start_period, end_period, status
        "#,
    )
    .bind(status)
    .bind(session_id)
    .bind(class_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!("Session {} of class {} is now {}", session_id, class_id, status.as_str());
    Ok(session)
}

/// Sessions are visible to the class's tutor, coordinators, and registered mentees.
pub async fn ensure_can_view_sessions(
    pool: &SqlitePool,
    caller_id: &str,
    caller_roles: &[Role],
    class_id: i64,
) -> AppResult<()> {
    // Unknown classes are NotFound for every caller, coordinators included
    let mut conn = pool.acquire().await?;
    let class = registration_service::load_class(&mut conn, class_id).await?;
    if is_class_staff(&class, caller_id, caller_roles)
        || registration_service::is_registered(&mut conn, class_id, caller_id).await?
    {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Mentee lists are visible to the class's tutor and coordinators.
pub async fn ensure_class_staff(
    pool: &SqlitePool,
    caller_id: &str,
    caller_roles: &[Role],
    class_id: i64,
) -> AppResult<()> {
    let mut conn = pool.acquire().await?;
    let class = registration_service::load_class(&mut conn, class_id).await?;
    if is_class_staff(&class, caller_id, caller_roles) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn is_class_staff(class: &Class, caller_id: &str, caller_roles: &[Role]) -> bool {
    class.tutor_id == caller_id || caller_roles.contains(&Role::Coordinator)
}
