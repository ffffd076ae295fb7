//! Timetable publishing, faculty directory and leave records

use rearrange_server::{
    error::AppError,
    models::{
        faculty::UpsertFaculty, leave::ApplyLeave, timetable::PublishTimetable, DayOfWeek,
        LeaveKind, LeaveStatus,
    },
};

use crate::common::{lab, monday, seeded, services, theory, year2_a, DEPT};

#[tokio::test]
async fn test_publish_rejects_overlap_with_expanded_lab() {
    let services = services();

    let err = services
        .timetable
        .publish_class(
            year2_a(),
            PublishTimetable {
                entries: vec![
                    lab(DayOfWeek::Tuesday, "P5", "OS Lab", "l", None),
                    theory(DayOfWeek::Tuesday, "P7", "Maths", "h"),
                ],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Same periods on different days are fine
    let published = tokio_test::assert_ok!(
        services
            .timetable
            .publish_class(
                year2_a(),
                PublishTimetable {
                    entries: vec![
                        lab(DayOfWeek::Tuesday, "P5", "OS Lab", "l", None),
                        theory(DayOfWeek::Wednesday, "P7", "Maths", "h"),
                    ],
                },
            )
            .await
    );
    assert_eq!(published.len(), 2);
}

#[tokio::test]
async fn test_publish_rejects_breaks_and_unknown_periods() {
    let services = services();

    for period in ["LB", "P9"] {
        let err = services
            .timetable
            .publish_class(
                year2_a(),
                PublishTimetable {
                    entries: vec![theory(DayOfWeek::Monday, period, "Maths", "h")],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[tokio::test]
async fn test_publish_replaces_class_timetable() {
    let services = seeded().await;

    services
        .timetable
        .publish_class(
            year2_a(),
            PublishTimetable {
                entries: vec![
                    theory(DayOfWeek::Friday, "P2", "Maths", "h"),
                    theory(DayOfWeek::Monday, "P4", "Data Structures", "f"),
                ],
            },
        )
        .await
        .unwrap();

    let entries = services.timetable.get_class(&year2_a()).await.unwrap();
    let slots: Vec<(DayOfWeek, &str)> = entries
        .iter()
        .map(|e| (e.day_of_week, e.period_id.as_str()))
        .collect();
    assert_eq!(slots, vec![(DayOfWeek::Monday, "P4"), (DayOfWeek::Friday, "P2")]);

    // Year3-B untouched
    let monday_entries = services
        .timetable
        .entries_for_weekday(DEPT, DayOfWeek::Monday)
        .await
        .unwrap();
    assert!(monday_entries.iter().any(|e| e.faculty_id == "k"));

    let f_entries = services
        .timetable
        .entries_for_faculty("f", DayOfWeek::Monday)
        .await
        .unwrap();
    assert_eq!(f_entries.len(), 1);
    assert_eq!(f_entries[0].period_id, "P4");
}

#[tokio::test]
async fn test_faculty_upsert_and_list() {
    let services = seeded().await;

    let updated = services
        .faculty
        .upsert(
            "g",
            UpsertFaculty {
                name: "Gita".into(),
                designation: Some("Professor".into()),
                department_id: DEPT.into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Gita");

    let listed = services.faculty.list(DEPT).await.unwrap();
    assert_eq!(listed.len(), 6);
    assert_eq!(services.faculty.get("g").await.unwrap().designation.as_deref(), Some("Professor"));

    assert!(matches!(
        services.faculty.get("nobody").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        services
            .faculty
            .upsert(
                "x",
                UpsertFaculty {
                    name: String::new(),
                    designation: None,
                    department_id: DEPT.into(),
                },
            )
            .await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_leave_lifecycle() {
    let services = seeded().await;

    let err = services
        .leaves
        .apply(
            "h",
            ApplyLeave {
                start_date: monday(),
                end_date: monday() - chrono::Duration::days(1),
                reason: "Travel".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let leave = services
        .leaves
        .apply(
            "h",
            ApplyLeave {
                start_date: monday(),
                end_date: monday(),
                reason: "Travel".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(leave.status, LeaveStatus::Pending);

    let decided = services
        .leaves
        .decide(leave.id, LeaveStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(decided.status, LeaveStatus::Rejected);

    assert!(matches!(
        services.leaves.decide(leave.id, LeaveStatus::Approved).await,
        Err(AppError::AlreadyResolved(_))
    ));
    assert!(!services.leaves.is_on_approved_leave("h", monday()).await.unwrap());
}

#[tokio::test]
async fn test_mark_absent_is_idempotent() {
    let services = seeded().await;

    let first = services.leaves.mark_absent("g", monday()).await.unwrap();
    let second = services.leaves.mark_absent("g", monday()).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.kind, LeaveKind::DayAbsence);
    assert_eq!(first.status, LeaveStatus::Approved);

    assert_eq!(services.leaves.list("g").await.unwrap().len(), 1);
    assert!(matches!(
        services.leaves.mark_absent("nobody", monday()).await,
        Err(AppError::NotFound(_))
    ));
}
