//! Shared fixtures: one department with two classes and a handful of faculty

use chrono::NaiveDate;

use rearrange_server::{
    config::TimetableConfig,
    models::{
        faculty::UpsertFaculty,
        timetable::{PublishTimetable, PublishedEntry},
        ClassKey, DayOfWeek, SubjectType,
    },
    repository::Repository,
    services::{notifications::Notifier, Services},
};

pub const DEPT: &str = "cse";

/// 2026-10-19
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 25).unwrap()
}

pub fn year2_a() -> ClassKey {
    ClassKey {
        department_id: DEPT.into(),
        year: 2,
        semester: 3,
        section: "A".into(),
    }
}

pub fn year3_b() -> ClassKey {
    ClassKey {
        department_id: DEPT.into(),
        year: 3,
        semester: 5,
        section: "B".into(),
    }
}

pub fn theory(day: DayOfWeek, period: &str, subject: &str, faculty_id: &str) -> PublishedEntry {
    PublishedEntry {
        day_of_week: day,
        period_id: period.into(),
        subject_id: subject.to_lowercase().replace(' ', "-"),
        subject_name: subject.into(),
        subject_type: SubjectType::Theory,
        faculty_id: faculty_id.into(),
        faculty_name: faculty_id.to_uppercase(),
        secondary_faculty_id: None,
        secondary_faculty_name: None,
        room: Some("204".into()),
    }
}

pub fn lab(
    day: DayOfWeek,
    period: &str,
    subject: &str,
    faculty_id: &str,
    secondary: Option<&str>,
) -> PublishedEntry {
    PublishedEntry {
        subject_type: SubjectType::Lab,
        secondary_faculty_id: secondary.map(String::from),
        secondary_faculty_name: secondary.map(str::to_uppercase),
        room: Some("Lab 1".into()),
        ..theory(day, period, subject, faculty_id)
    }
}

pub fn services() -> Services {
    Services::new(
        Repository::in_memory(),
        &TimetableConfig::default(),
        Notifier::new(64),
    )
}

/// Faculty f, g, h, k, l, m in `cse`. On Mondays:
/// - Year2-A: P1 Maths (h), P3 Data Structures (f), P5-P7 OS Lab (l, secondary m)
/// - Year3-B: P3 Networks (k), P4 Compilers (g)
pub async fn seeded() -> Services {
    let services = services();

    for (id, name) in [
        ("f", "F"),
        ("g", "G"),
        ("h", "H"),
        ("k", "K"),
        ("l", "L"),
        ("m", "M"),
    ] {
        services
            .faculty
            .upsert(
                id,
                UpsertFaculty {
                    name: name.into(),
                    designation: Some("Assistant Professor".into()),
                    department_id: DEPT.into(),
                },
            )
            .await
            .unwrap();
    }

    services
        .timetable
        .publish_class(
            year2_a(),
            PublishTimetable {
                entries: vec![
                    theory(DayOfWeek::Monday, "P1", "Maths", "h"),
                    theory(DayOfWeek::Monday, "P3", "Data Structures", "f"),
                    lab(DayOfWeek::Monday, "P5", "OS Lab", "l", Some("m")),
                ],
            },
        )
        .await
        .unwrap();

    services
        .timetable
        .publish_class(
            year3_b(),
            PublishTimetable {
                entries: vec![
                    theory(DayOfWeek::Monday, "P3", "Networks", "k"),
                    theory(DayOfWeek::Monday, "P4", "Compilers", "g"),
                ],
            },
        )
        .await
        .unwrap();

    services
}
