// src/services/catalog_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        class::{ClassFilter, ClassListing, SubjectGroup, CLASS_COLUMNS},
        session::Session,
        subject::Subject,
    },
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

// Subjects

pub async fn list_subjects(pool: &SqlitePool) -> AppResult<Vec<Subject>> {
    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, code, created_at FROM subjects ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    tracing::debug!("Found {} subjects", subjects.len());
    Ok(subjects)
}

pub async fn get_subject(pool: &SqlitePool, subject_id: i64) -> AppResult<Subject> {
    sqlx::query_as::<_, Subject>("SELECT id, name, code, created_at FROM subjects WHERE id = ?1")
        .bind(subject_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subject {subject_id}")))
}

pub async fn create_subject(pool: &SqlitePool, name: &str, code: &str) -> AppResult<Subject> {
    let (name, code) = (name.trim(), code.trim());
    if name.is_empty() || code.is_empty() {
        return Err(AppError::InvalidRequest("Subject name and code are required".into()));
    }

    let subject = sqlx::query_as::<_, Subject>(
        "INSERT INTO subjects (name, code) VALUES (?1, ?2) RETURNING id, name, code, created_at",
    )
    .bind(name)
    .bind(code)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::InvalidRequest(format!("Subject code '{code}' already exists"));
            }
        }
        AppError::SqlxError(e)
    })?;

    tracing::info!("Subject {} ({}) created", subject.code, subject.id);
    Ok(subject)
}

// Classes

/// Classes with subject and tutor names, newest first. Filters combine with AND.
pub async fn list_classes(pool: &SqlitePool, filter: &ClassFilter) -> AppResult<Vec<ClassListing>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        r#"
        SELECT {CLASS_COLUMNS},
               s.name AS subject_name, s.code AS subject_code, u.full_name AS tutor_name
        FROM classes c
        JOIN subjects s ON c.subject_id = s.id
        LEFT JOIN users u ON c.tutor_id = u.id
        WHERE 1 = 1
        "#
    ));

    if let Some(subject_id) = filter.subject_id {
        query.push(" AND c.subject_id = ").push_bind(subject_id);
    }
    if let Some(tutor_id) = &filter.tutor_id {
        query.push(" AND c.tutor_id = ").push_bind(tutor_id.clone());
    }
    if let Some(status) = filter.status {
        query.push(" AND c.status = ").push_bind(status);
    }
    query.push(" ORDER BY c.created_at DESC, c.id DESC");

    let classes = query
        .build_query_as::<ClassListing>()
        .fetch_all(pool)
        .await?;
    tracing::debug!("Catalog query {:?} returned {} classes", filter, classes.len());
    Ok(classes)
}

/// Groups classes under their subject. Subjects appear in the order their
/// first class appears; classes keep their relative order.
pub fn group_by_subject(classes: Vec<ClassListing>) -> Vec<SubjectGroup> {
    let mut groups: Vec<SubjectGroup> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for listing in classes {
        let subject_id = listing.class.subject_id;
        let slot = *index.entry(subject_id).or_insert_with(|| {
            groups.push(SubjectGroup {
                subject_id,
                subject_name: listing.subject_name.clone(),
                subject_code: listing.subject_code.clone(),
                classes: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].classes.push(listing);
    }

    groups
}

pub async fn grouped_classes(pool: &SqlitePool, filter: &ClassFilter) -> AppResult<Vec<SubjectGroup>> {
    Ok(group_by_subject(list_classes(pool, filter).await?))
}


pub async fn sessions_by_class(pool: &SqlitePool, class_id: i64) -> AppResult<Vec<Session>> {
    let sessions = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, class_id, week_number, session_date, start_period, end_period, status
        FROM sessions
        WHERE class_id = ?1
        ORDER BY session_date ASC, start_period ASC
        "#,
    )
    .bind(class_id)
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_subject, insert_user, test_pool, ClassSeed};
    use crate::models::class::{Class, ClassStatus};
    use crate::models::user::Role;

    fn listing(id: i64, subject_id: i64, code: &str) -> ClassListing {
        ClassListing {
            class: Class {
                id,
                subject_id,
                tutor_id: "t".into(),
                location: None,
                capacity: 5,
                current_enrolled: 0,
                week_day: 1,
                start_period: 1,
                end_period: 2,
                semester: "2025-1".into(),
                num_of_weeks: 1,
                start_date: None,
                registration_deadline: None,
                status: ClassStatus::Open,
                created_at: None,
            },
            subject_name: format!("Subject {code}"),
            subject_code: code.into(),
            tutor_name: None,
        }
    }

    #[test]
    fn grouping_keeps_first_seen_subject_order() {
        let classes = vec![
            listing(1, 30, "PH"),
            listing(2, 10, "CS"),
            listing(3, 30, "PH"),
            listing(4, 20, "MA"),
            listing(5, 10, "CS"),
        ];

        let groups = group_by_subject(classes);

        let order: Vec<i64> = groups.iter().map(|g| g.subject_id).collect();
        assert_eq!(order, vec![30, 10, 20]);
        let ph: Vec<i64> = groups[0].classes.iter().map(|l| l.class.id).collect();
        assert_eq!(ph, vec![1, 3]);
        assert_eq!(groups[1].subject_code, "CS");
        assert_eq!(groups[1].classes.len(), 2);
    }

    #[test]
    fn grouping_empty_catalog() {
        assert!(group_by_subject(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn filters_combine() {
        let pool = test_pool().await;
        let t1 = insert_user(&pool, "t1@uni.edu", Role::Tutor).await;
        let t2 = insert_user(&pool, "t2@uni.edu", Role::Tutor).await;
        let cs = insert_subject(&pool, "CS101").await;
        let ma = insert_subject(&pool, "MA101").await;
        ClassSeed::new(cs, &t1, 1, 1, 2).insert(&pool).await;
        ClassSeed::new(cs, &t2, 2, 1, 2).insert(&pool).await;
        ClassSeed::new(ma, &t1, 3, 1, 2).insert(&pool).await;

        assert_eq!(list_classes(&pool, &ClassFilter::default()).await.unwrap().len(), 3);
        let by_subject = ClassFilter {
            subject_id: Some(cs),
            ..ClassFilter::default()
        };
        assert_eq!(list_classes(&pool, &by_subject).await.unwrap().len(), 2);
        let by_tutor = ClassFilter {
            tutor_id: Some(t1.clone()),
            ..ClassFilter::default()
        };
        assert_eq!(list_classes(&pool, &by_tutor).await.unwrap().len(), 2);

        let both = ClassFilter {
            subject_id: Some(cs),
            tutor_id: Some(t1.clone()),
            status: Some(ClassStatus::Open),
        };
        let only = list_classes(&pool, &both).await.unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].subject_code, "CS101");
        assert_eq!(only[0].tutor_name.as_deref(), Some("t1"));

        let closed = ClassFilter {
            status: Some(ClassStatus::Closed),
            ..ClassFilter::default()
        };
        assert!(list_classes(&pool, &closed).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn subjects_are_unique_by_code() {
        let pool = test_pool().await;
        let created = create_subject(&pool, "Algorithms", "CS201").await.unwrap();
        assert_eq!(get_subject(&pool, created.id).await.unwrap().code, "CS201");

        assert!(matches!(
            create_subject(&pool, "Other", "CS201").await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            get_subject(&pool, 777).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(list_subjects(&pool).await.unwrap().len(), 1);
    }
}
