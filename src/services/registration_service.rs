// src/services/registration_service.rs
use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        class::{Class, CLASS_COLUMNS},
        registration::{
            ClassMentee, ConflictReport, MenteeRegistration, Registration, RescheduleOutcome,
        },
        user::Role,
    },
    services::conflict_service::detect_conflicts,
};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

// --- REGISTER ---

/// Registers a mentee for a class.
///
/// Checks run in this order: class exists, mentee exists, not already
/// registered, deadline, capacity, one class per subject per semester, time
/// conflicts. The registration row and the enrollment increment commit together.
pub async fn register(
    pool: &SqlitePool,
    class_id: i64,
    mentee_id: &str,
    now: DateTime<Utc>,
) -> AppResult<Registration> {
    tracing::debug!("Register: mentee {} -> class {}", mentee_id, class_id);
    let mut tx = pool.begin().await?;
    db::claim_write_lock(&mut tx, class_id).await?;

    // 1. Validate the class and the mentee
    let class = load_class(&mut tx, class_id).await?;
    ensure_mentee(&mut tx, mentee_id).await?;

    if is_registered(&mut tx, class_id, mentee_id).await? {
        return Err(AppError::AlreadyRegistered);
    }
    if class.deadline_passed(now) {
        return Err(AppError::DeadlinePassed);
    }
    if class.is_full() {
        return Err(AppError::Capacity);
    }

    // 2. Same subject twice in one semester
    if let Some((taken_id, subject_code)) = subject_taken(&mut tx, mentee_id, &class, None).await? {
        return Err(AppError::SubjectAlreadyTaken {
            subject_code,
            class_id: taken_id,
            semester: class.semester.clone(),
        });
    }

    // 3. Weekly time-slot conflicts
    let held = held_classes(&mut tx, mentee_id).await?;
    let conflicts = detect_conflicts(&class, &held);
    if !conflicts.is_empty() {
        return Err(AppError::Conflict(conflicts));
    }

    // 4. Persist
    let registration = insert_registration(&mut tx, class_id, mentee_id, now).await?;
    increment_enrollment(&mut tx, class_id).await?;
    tx.commit().await?;

    tracing::info!("Mentee {} registered for class {}", mentee_id, class_id);
    Ok(registration)
}

// --- CANCEL ---

/// Removes a registration and releases its seat. The count never drops below zero.
pub async fn cancel(pool: &SqlitePool, class_id: i64, mentee_id: &str) -> AppResult<Registration> {
    tracing::debug!("Cancel: mentee {} from class {}", mentee_id, class_id);
    let mut tx = pool.begin().await?;
    db::claim_write_lock(&mut tx, class_id).await?;

    load_class(&mut tx, class_id).await?;

    let removed = delete_registration(&mut tx, class_id, mentee_id)
        .await?
        .ok_or(AppError::NotRegistered)?;
    decrement_enrollment(&mut tx, class_id).await?;
    tx.commit().await?;

    tracing::info!("Mentee {} cancelled class {}", mentee_id, class_id);
    Ok(removed)
}

// --- RESCHEDULE ---

/// Moves a mentee from one class to another class of the same subject.
///
/// Either both registrations and both counters change, or nothing does.
pub async fn reschedule(
    pool: &SqlitePool,
    old_class_id: i64,
    new_class_id: i64,
    mentee_id: &str,
    now: DateTime<Utc>,
) -> AppResult<RescheduleOutcome> {
    if old_class_id == new_class_id {
        return Err(AppError::InvalidRequest(
            "Old class and new class cannot be the same".into(),
        ));
    }
    tracing::debug!(
        "Reschedule: mentee {} from class {} to class {}",
        mentee_id,
        old_class_id,
        new_class_id
    );

    let mut tx = pool.begin().await?;
    db::claim_write_lock(&mut tx, old_class_id).await?;

    // 1. Both classes, same subject
    let old_class = load_class(&mut tx, old_class_id).await?;
    let new_class = load_class(&mut tx, new_class_id).await?;
    if old_class.subject_id != new_class.subject_id {
        return Err(AppError::SubjectMismatch);
    }
    ensure_mentee(&mut tx, mentee_id).await?;

    // 2. The registration being moved
    if !is_registered(&mut tx, old_class_id, mentee_id).await? {
        return Err(AppError::NotRegistered);
    }
    if old_class.deadline_passed(now) {
        return Err(AppError::DeadlinePassed);
    }

    // 3. The target class
    if new_class.deadline_passed(now) {
        return Err(AppError::DeadlinePassed);
    }
    if new_class.is_full() {
        return Err(AppError::Capacity);
    }
    if is_registered(&mut tx, new_class_id, mentee_id).await? {
        return Err(AppError::AlreadyRegistered);
    }
    // Moving across semesters must not leave two classes of the subject in one term
    if let Some((taken_id, subject_code)) =
        subject_taken(&mut tx, mentee_id, &new_class, Some(old_class_id)).await?
    {
        return Err(AppError::SubjectAlreadyTaken {
            subject_code,
            class_id: taken_id,
            semester: new_class.semester.clone(),
        });
    }

    // 4. Conflicts against everything except the class being left
    let held: Vec<Class> = held_classes(&mut tx, mentee_id)
        .await?
        .into_iter()
        .filter(|c| c.id != old_class_id)
        .collect();
    let conflicts = detect_conflicts(&new_class, &held);
    if !conflicts.is_empty() {
        return Err(AppError::Conflict(conflicts));
    }

    // 5. Swap; dropping `tx` on any error rolls the whole swap back
    delete_registration(&mut tx, old_class_id, mentee_id)
        .await?
        .ok_or(AppError::NotRegistered)?;
    decrement_enrollment(&mut tx, old_class_id).await?;
    let registration = insert_registration(&mut tx, new_class_id, mentee_id, now).await?;
    increment_enrollment(&mut tx, new_class_id).await?;
    tx.commit().await?;

    tracing::info!(
        "Mentee {} rescheduled from class {} to class {}",
        mentee_id,
        old_class_id,
        new_class_id
    );
    Ok(RescheduleOutcome {
        old_class_id,
        new_class_id,
        mentee_id: mentee_id.to_string(),
        rescheduled_at: registration.registration_log,
    })
}

// --- READ-ONLY ---

/// What `register` would report as time conflicts, without changing anything.
pub async fn check_conflict(
    pool: &SqlitePool,
    mentee_id: &str,
    class_id: i64,
) -> AppResult<ConflictReport> {
    let mut conn = pool.acquire().await?;
    let class = load_class(&mut conn, class_id).await?;
    ensure_mentee(&mut conn, mentee_id).await?;
    let held = held_classes(&mut conn, mentee_id).await?;
    Ok(detect_conflicts(&class, &held).into())
}

pub async fn registrations_by_mentee(
    pool: &SqlitePool,
    mentee_id: &str,
) -> AppResult<Vec<MenteeRegistration>> {
    let query = format!(
        r#"
        SELECT cr.registration_log AS registration_log, {CLASS_COLUMNS},
               s.name AS subject_name, s.code AS subject_code, u.full_name AS tutor_name
        FROM class_registrations cr
        JOIN classes c ON cr.class_id = c.id
        JOIN subjects s ON c.subject_id = s.id
        LEFT JOIN users u ON c.tutor_id = u.id
        WHERE cr.mentee_id = ?1
        ORDER BY c.week_day ASC, c.start_period ASC
        "#
    );
    let rows = sqlx::query_as::<_, MenteeRegistration>(&query)
        .bind(mentee_id)
        .fetch_all(pool)
        .await?;
    tracing::debug!("Mentee {} holds {} registrations", mentee_id, rows.len());
    Ok(rows)
}

pub async fn mentees_by_class(pool: &SqlitePool, class_id: i64) -> AppResult<Vec<ClassMentee>> {
    let mut conn = pool.acquire().await?;
    load_class(&mut conn, class_id).await?;

    let mentees = sqlx::query_as::<_, ClassMentee>(
        r#"
        SELECT u.id AS mentee_id, u.full_name, u.email, cr.registration_log
        FROM class_registrations cr
        JOIN users u ON cr.mentee_id = u.id
        WHERE cr.class_id = ?1
        ORDER BY cr.registration_log ASC
        "#,
    )
    .bind(class_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(mentees)
}

// Helpers below run on the caller's connection or transaction

pub(crate) async fn load_class(conn: &mut SqliteConnection, class_id: i64) -> AppResult<Class> {
    let query = format!("SELECT {CLASS_COLUMNS} FROM classes c WHERE c.id = ?1");
    sqlx::query_as::<_, Class>(&query)
        .bind(class_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Class {class_id}")))
}

/// The user must exist and hold the mentee role; anything else is `NotFound`.
async fn ensure_mentee(conn: &mut SqliteConnection, mentee_id: &str) -> AppResult<()> {
    let is_mentee: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = ?1 AND role = ?2)",
    )
    .bind(mentee_id)
    .bind(Role::Mentee.as_str())
    .fetch_one(conn)
    .await?;
    if is_mentee {
        Ok(())
    } else {
        tracing::warn!("{} is not a known mentee", mentee_id);
        Err(AppError::NotFound(format!("Mentee {mentee_id}")))
    }
}

pub(crate) async fn is_registered(
    conn: &mut SqliteConnection,
    class_id: i64,
    mentee_id: &str,
) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM class_registrations WHERE class_id = ?1 AND mentee_id = ?2)",
    )
    .bind(class_id)
    .bind(mentee_id)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

async fn held_classes(conn: &mut SqliteConnection, mentee_id: &str) -> AppResult<Vec<Class>> {
    let query = format!(
        r#"
        SELECT {CLASS_COLUMNS}
        FROM class_registrations cr
        JOIN classes c ON cr.class_id = c.id
        WHERE cr.mentee_id = ?1
        "#
    );
    let classes = sqlx::query_as::<_, Class>(&query)
        .bind(mentee_id)
        .fetch_all(conn)
        .await?;
    Ok(classes)
}

/// Another class of the same subject and semester the mentee already holds.
///
/// `leaving` names a class the mentee is about to drop, which does not count.
async fn subject_taken(
    conn: &mut SqliteConnection,
    mentee_id: &str,
    class: &Class,
    leaving: Option<i64>,
) -> AppResult<Option<(i64, String)>> {
    let row: Option<(i64, String)> = sqlx::query_as(
        r#"
        SELECT c.id, s.code
        FROM class_registrations cr
        JOIN classes c ON cr.class_id = c.id
        JOIN subjects s ON c.subject_id = s.id
        WHERE cr.mentee_id = ?1
          AND c.subject_id = ?2
          AND c.semester = ?3
          AND c.id != ?4
          AND c.id != ?5
        LIMIT 1
        "#,
    )
    .bind(mentee_id)
    .bind(class.subject_id)
    .bind(&class.semester)
    .bind(class.id)
    .bind(leaving.unwrap_or(class.id))
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

async fn insert_registration(
    conn: &mut SqliteConnection,
    class_id: i64,
    mentee_id: &str,
    now: DateTime<Utc>,
) -> AppResult<Registration> {
    let registration = sqlx::query_as::<_, Registration>(
        r#"
        INSERT INTO class_registrations (class_id, mentee_id, registration_log)
        VALUES (?1, ?2, ?3)
        RETURNING class_id, mentee_id, registration_log
        "#,
    )
    .bind(class_id)
    .bind(mentee_id)
    .bind(now)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::AlreadyRegistered;
            }
        }
        AppError::SqlxError(e)
    })?;
    Ok(registration)
}

async fn delete_registration(
    conn: &mut SqliteConnection,
    class_id: i64,
    mentee_id: &str,
) -> AppResult<Option<Registration>> {
    let removed = sqlx::query_as::<_, Registration>(
        r#"
        DELETE FROM class_registrations
        WHERE class_id = ?1 AND mentee_id = ?2
        RETURNING class_id, mentee_id, registration_log
        "#,
    )
    .bind(class_id)
    .bind(mentee_id)
    .fetch_optional(conn)
    .await?;
    Ok(removed)
}

/// Takes a seat only while one is free; zero rows touched means the class filled up.
async fn increment_enrollment(conn: &mut SqliteConnection, class_id: i64) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE classes
        SET current_enrolled = current_enrolled + 1
        WHERE id = ?1 AND current_enrolled < capacity
        "#,
    )
    .bind(class_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Capacity);
    }
    Ok(())
}

async fn decrement_enrollment(conn: &mut SqliteConnection, class_id: i64) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE classes
        SET current_enrolled = current_enrolled - 1
        WHERE id = ?1 AND current_enrolled > 0
        "#,
    )
    .bind(class_id)
    .execute(conn)
    .await?;
    Ok(())
}
