// src/templates.rs
use crate::models::{
    class::{period_hour, weekday_name, FIRST_PERIOD, LAST_PERIOD},
    registration::MenteeRegistration,
};
use askama::Template;

/// One occupied cell of the timetable.
#[derive(Clone, Debug)]
pub struct ScheduleCell {
    pub subject_code: String,
    pub location: String,
    pub class_id: i64,
}

/// One period row: the hour label plus a cell per weekday (Monday first).
#[derive(Clone, Debug)]
pub struct ScheduleRow {
    pub period: i64,
    pub hour_label: String,
    pub cells: Vec<Option<ScheduleCell>>,
}

#[derive(Clone, Debug)]
pub struct ScheduleEntry {
    pub subject_code: String,
    pub subject_name: String,
    pub tutor_name: String,
    pub day: &'static str,
    pub hours: String,
    pub semester: String,
    pub status: &'static str,
}

#[derive(Template)]
#[template(path = "schedule.html")]
pub struct SchedulePage {
    pub user_name: String,
    pub day_names: Vec<&'static str>,
    pub rows: Vec<ScheduleRow>,
    pub entries: Vec<ScheduleEntry>,
}

impl SchedulePage {
    /// Lays registrations out on a weekday x period grid.
    pub fn build(user_name: String, registrations: &[MenteeRegistration]) -> Self {
        let mut rows: Vec<ScheduleRow> = (FIRST_PERIOD..=LAST_PERIOD)
            .map(|period| ScheduleRow {
                period,
                hour_label: format!("{:02}:00", period_hour(period)),
                cells: vec![None; 7],
            })
            .collect();

        let mut entries = Vec::with_capacity(registrations.len());
        for reg in registrations {
            let listing = &reg.listing;
            let class = &listing.class;
            let slot = class.time_slot();
            let cell = ScheduleCell {
                subject_code: listing.subject_code.clone(),
                location: class.location.clone().unwrap_or_default(),
                class_id: class.id,
            };

            let day = (slot.week_day - 1) as usize;
            for row in rows
                .iter_mut()
                .filter(|r| r.period >= slot.start_period && r.period < slot.end_period)
            {
                if let Some(target) = row.cells.get_mut(day) {
                    *target = Some(cell.clone());
                }
            }

            entries.push(ScheduleEntry {
                subject_code: listing.subject_code.clone(),
                subject_name: listing.subject_name.clone(),
                tutor_name: listing.tutor_name.clone().unwrap_or_default(),
                day: weekday_name(slot.week_day),
                hours: format!("{:02}:00-{:02}:00", slot.start_hour(), slot.end_hour()),
                semester: class.semester.clone(),
                status: class.status.as_str(),
            });
        }

        Self {
            user_name,
            day_names: (1..=7).map(weekday_name).collect(),
            rows,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::class::{Class, ClassListing, ClassStatus};
    use chrono::Utc;

    fn registration(id: i64, week_day: i64, start: i64, end: i64) -> MenteeRegistration {
        MenteeRegistration {
            registration_log: Utc::now(),
            listing: ClassListing {
                class: Class {
                    id,
                    subject_id: id,
                    tutor_id: "t".into(),
                    location: Some("H1".into()),
                    capacity: 10,
                    current_enrolled: 1,
                    week_day,
                    start_period: start,
                    end_period: end,
                    semester: "2025-1".into(),
                    num_of_weeks: 10,
                    start_date: None,
                    registration_deadline: None,
                    status: ClassStatus::Open,
                    created_at: None,
                },
                subject_name: "Algorithms".into(),
                subject_code: format!("CS{id}"),
                tutor_name: Some("Tutor".into()),
            },
        }
    }

    #[test]
    fn occupies_half_open_period_range() {
        // Tuesday, periods 2..4 (07:00-09:00)
        let page = SchedulePage::build("Ana".into(), &[registration(7, 2, 2, 4)]);

        assert_eq!(page.rows.len(), 17);
        assert_eq!(page.rows[0].hour_label, "06:00");
        let tuesday = |p: usize| page.rows[p - 1].cells[1].as_ref().map(|c| c.class_id);
        assert_eq!(tuesday(1), None);
        assert_eq!(tuesday(2), Some(7));
        assert_eq!(tuesday(3), Some(7));
        assert_eq!(tuesday(4), None);
        assert_eq!(page.entries[0].hours, "07:00-09:00");
    }

    #[test]
    fn renders_html() {
        let page = SchedulePage::build("Ana".into(), &[registration(3, 5, 10, 12)]);
        let html = page.render().unwrap();
        assert!(html.contains("CS3"));
        assert!(html.contains("Ana"));
    }
}
