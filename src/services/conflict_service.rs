// src/services/conflict_service.rs
//! Weekly time-slot conflict detection between a candidate class and the
//! classes a mentee already holds.

use crate::models::{class::Class, registration::ConflictDetail};

/// Every class in `existing` that shares the candidate's semester and weekday
/// and whose `[start_period, end_period)` intersects the candidate's.
///
/// Reports all collisions, not just the first. A class never conflicts with
/// itself. Slots are assumed valid (`start < end`); creation rejects the rest.
pub fn detect_conflicts(candidate: &Class, existing: &[Class]) -> Vec<ConflictDetail> {
    let slot = candidate.time_slot();

    existing
        .iter()
        .filter(|held| held.id != candidate.id)
        .filter(|held| held.semester == candidate.semester)
        .filter(|held| held.time_slot().overlaps(&slot))
        .map(|held| ConflictDetail {
            conflicting_class_id: held.id,
            conflicting_subject_id: held.subject_id,
            week_day: held.week_day,
            semester: held.semester.clone(),
            conflicting_start_period: held.start_period,
            conflicting_end_period: held.end_period,
            new_class_id: candidate.id,
            new_start_period: candidate.start_period,
            new_end_period: candidate.end_period,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::class::ClassStatus;

    fn class(id: i64, week_day: i64, start: i64, end: i64, semester: &str) -> Class {
        Class {
            id,
            subject_id: id * 10,
            tutor_id: "tutor".into(),
            location: None,
            capacity: 10,
            current_enrolled: 0,
            week_day,
            start_period: start,
            end_period: end,
            semester: semester.into(),
            num_of_weeks: 1,
            start_date: None,
            registration_deadline: None,
            status: ClassStatus::Open,
            created_at: None,
        }
    }

    #[test]
    fn flags_overlap_on_same_day_and_semester() {
        let held = class(1, 1, 3, 5, "2025-1");
        let candidate = class(2, 1, 4, 6, "2025-1");

        let conflicts = detect_conflicts(&candidate, &[held]);

        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.conflicting_class_id, 1);
        assert_eq!(c.conflicting_subject_id, 10);
        assert_eq!((c.conflicting_start_period, c.conflicting_end_period), (3, 5));
        assert_eq!((c.new_start_period, c.new_end_period), (4, 6));
        assert_eq!(c.new_class_id, 2);
    }

    #[test]
    fn adjacent_slots_do_not_conflict() {
        let held = class(1, 1, 3, 5, "2025-1");
        assert!(detect_conflicts(&class(2, 1, 5, 7, "2025-1"), &[held.clone()]).is_empty());
        assert!(detect_conflicts(&class(3, 1, 1, 3, "2025-1"), &[held]).is_empty());
    }

    #[test]
    fn different_day_or_semester_never_conflicts() {
        let held = class(1, 1, 3, 5, "2025-1");
        assert!(detect_conflicts(&class(2, 2, 3, 5, "2025-1"), &[held.clone()]).is_empty());
        assert!(detect_conflicts(&class(3, 1, 3, 5, "2025-2"), &[held]).is_empty());
    }

    #[test]
    fn reports_every_conflict() {
        let existing = vec![
            class(1, 3, 1, 3, "2025-1"),
            class(2, 3, 4, 6, "2025-1"),
            class(3, 3, 8, 9, "2025-1"),
        ];
        let candidate = class(9, 3, 2, 5, "2025-1");

        let ids: Vec<i64> = detect_conflicts(&candidate, &existing)
            .iter()
            .map(|c| c.conflicting_class_id)
            .collect();

        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn a_class_does_not_conflict_with_itself() {
        let held = class(1, 1, 3, 5, "2025-1");
        assert!(detect_conflicts(&held.clone(), &[held]).is_empty());
    }

    #[test]
    fn overlap_matches_interval_intersection_exhaustively() {
        for a_start in 1..8 {
            for a_end in (a_start + 1)..9 {
                for b_start in 1..8 {
                    for b_end in (b_start + 1)..9 {
                        let held = class(1, 4, a_start, a_end, "2025-1");
                        let candidate = class(2, 4, b_start, b_end, "2025-1");
                        let intersects = (a_start..a_end).any(|p| (b_start..b_end).contains(&p));
                        assert_eq!(
                            !detect_conflicts(&candidate, &[held]).is_empty(),
                            intersects,
                            "[{a_start},{a_end}) vs [{b_start},{b_end})"
                        );
                    }
                }
            }
        }
    }
}
