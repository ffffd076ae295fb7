//! Negotiation, availability and effective-schedule scenarios

use std::sync::Arc;

use rearrange_server::{
    error::AppError,
    models::{
        rearrangement::CreateRearrangement, DayOfWeek, Decision, RequestStatus, ScheduleScope,
        SlotStatus,
    },
    services::notifications::EventKind,
};

use crate::common::{monday, seeded, sunday, year2_a, DEPT};

fn request(original: &str, substitute: &str, period: &str) -> CreateRearrangement {
    CreateRearrangement {
        date: monday(),
        period_id: period.into(),
        department_id: DEPT.into(),
        original_faculty_id: original.into(),
        substitute_faculty_id: substitute.into(),
        subject_name: None,
        class_label: None,
    }
}

fn ids(candidates: &[rearrange_server::models::AvailabilityCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.id.as_str()).collect()
}

#[tokio::test]
async fn test_scenario_a_accepted_substitution_overlays_all_views() {
    let services = seeded().await;

    let free = services
        .availability
        .find_free(DEPT, monday(), "P3", Some("f"))
        .await
        .unwrap();
    // f excluded, k teaches P3
    assert_eq!(ids(&free), vec!["g", "h", "l", "m"]);

    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.subject_name, "Data Structures");
    assert_eq!(created.class_label, "Year2-A");
    assert_eq!(created.class_key(), year2_a());

    let accepted = services
        .negotiation
        .respond(created.id, "g", Decision::Accept)
        .await
        .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert!(accepted.responded_at.is_some());

    let class = services
        .effective
        .resolve(ScheduleScope::Class { class: year2_a() }, monday())
        .await
        .unwrap();
    let p3 = class.slots.iter().find(|s| s.period_id == "P3").unwrap();
    assert_eq!(p3.faculty_id, "g");
    assert_eq!(p3.subject_name, "Data Structures");
    assert_eq!(p3.status, SlotStatus::Substituted);

    let absent = services
        .effective
        .resolve(ScheduleScope::Faculty { faculty_id: "f".into() }, monday())
        .await
        .unwrap();
    assert_eq!(absent.slots.len(), 1);
    assert_eq!(absent.slots[0].status, SlotStatus::CoveredBySubstitute);
    assert_eq!(absent.slots[0].faculty_name, "G");

    let substitute = services
        .effective
        .resolve(ScheduleScope::Faculty { faculty_id: "g".into() }, monday())
        .await
        .unwrap();
    let periods: Vec<&str> = substitute.slots.iter().map(|s| s.period_id.as_str()).collect();
    assert_eq!(periods, vec!["P3", "P4"]);
    assert_eq!(substitute.slots[0].status, SlotStatus::Covering);
    assert_eq!(
        substitute.slots[0].display,
        "covering F for Data Structures, Year2-A"
    );

    // g is now committed at P3
    let free = services
        .availability
        .find_free(DEPT, monday(), "P3", Some("f"))
        .await
        .unwrap();
    assert_eq!(ids(&free), vec!["h", "l", "m"]);

    // The following Monday is untouched
    let next_week = monday() + chrono::Duration::days(7);
    let class = services
        .effective
        .resolve(ScheduleScope::Class { class: year2_a() }, next_week)
        .await
        .unwrap();
    let p3 = class.slots.iter().find(|s| s.period_id == "P3").unwrap();
    assert_eq!(p3.faculty_id, "f");
    assert_eq!(p3.status, SlotStatus::Scheduled);
}

#[tokio::test]
async fn test_scenario_b_substitute_cannot_cover_two_classes() {
    let services = seeded().await;

    let from_f = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    let from_k = services
        .negotiation
        .create_request(request("k", "g", "P3"))
        .await
        .unwrap();

    services
        .negotiation
        .respond(from_f.id, "g", Decision::Accept)
        .await
        .unwrap();

    let err = services
        .negotiation
        .respond(from_k.id, "g", Decision::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_) | AppError::AlreadyResolved(_)));

    // The refused request stays pending and can still be rejected
    let still_pending = services.negotiation.get(from_k.id).await.unwrap();
    assert_eq!(still_pending.status, RequestStatus::Pending);

    let schedule = services
        .effective
        .resolve(ScheduleScope::Faculty { faculty_id: "g".into() }, monday())
        .await
        .unwrap();
    let covering: Vec<_> = schedule
        .slots
        .iter()
        .filter(|s| s.status == SlotStatus::Covering && s.period_id == "P3")
        .collect();
    assert_eq!(covering.len(), 1);
    assert_eq!(covering[0].class_label, "Year2-A");
}

#[tokio::test]
async fn test_scenario_c_fully_booked_period() {
    let services = seeded().await;

    for id in ["g", "h", "l", "m"] {
        services.leaves.mark_absent(id, monday()).await.unwrap();
    }

    let free = services
        .availability
        .find_free(DEPT, monday(), "P3", Some("f"))
        .await
        .unwrap();
    assert!(free.is_empty());

    let err = services
        .negotiation
        .create_request(request("f", "h", "P3"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unavailable(_)));

    // k teaches P3 itself
    let err = services
        .negotiation
        .create_request(request("f", "k", "P3"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unavailable(_)));
}

#[tokio::test]
async fn test_concurrent_accepts_of_same_request() {
    let services = Arc::new(seeded().await);
    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let services = services.clone();
        handles.push(tokio::spawn(async move {
            services
                .negotiation
                .respond(created.id, "g", Decision::Accept)
                .await
        }));
    }

    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => applied += 1,
            Err(AppError::AlreadyResolved(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn test_concurrent_accepts_for_same_substitute_slot() {
    let services = Arc::new(seeded().await);
    let first = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    let second = services
        .negotiation
        .create_request(request("k", "g", "P3"))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        services.negotiation.respond(first.id, "g", Decision::Accept),
        services.negotiation.respond(second.id, "g", Decision::Accept),
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    let accepted = services.negotiation.list_for_date(monday(), None).await.unwrap();
    let accepted: Vec<_> = accepted
        .iter()
        .filter(|r| r.status == RequestStatus::Accepted)
        .collect();
    assert_eq!(accepted.len(), 1);
}

#[tokio::test]
async fn test_state_machine_rules() {
    let services = seeded().await;
    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();

    // Only the designated substitute may respond
    let err = services
        .negotiation
        .respond(created.id, "h", Decision::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    services
        .negotiation
        .respond(created.id, "g", Decision::Reject)
        .await
        .unwrap();

    for decision in [Decision::Accept, Decision::Reject] {
        let err = services
            .negotiation
            .respond(created.id, "g", decision)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyResolved(_)));
    }

    let err = services
        .negotiation
        .respond(uuid::Uuid::new_v4(), "g", Decision::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // A rejected request no longer holds the slot
    services
        .negotiation
        .create_request(request("f", "h", "P3"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_duplicate_live_request_is_conflict() {
    let services = seeded().await;
    services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();

    let err = services
        .negotiation
        .create_request(request("f", "h", "P3"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_create_request_preconditions() {
    let services = seeded().await;

    let mut on_sunday = request("f", "g", "P3");
    on_sunday.date = sunday();
    assert!(matches!(
        services.negotiation.create_request(on_sunday).await,
        Err(AppError::Validation(_))
    ));

    assert!(matches!(
        services.negotiation.create_request(request("f", "g", "SB")).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        services.negotiation.create_request(request("f", "f", "P3")).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        services.negotiation.create_request(request("f", "g", "P2")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        services.negotiation.create_request(request("nobody", "g", "P3")).await,
        Err(AppError::NotFound(_))
    ));
    // m is only the secondary faculty of the OS lab
    assert!(matches!(
        services.negotiation.create_request(request("m", "g", "P6")).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_lab_primary_can_be_covered_on_any_spanned_period() {
    let services = seeded().await;

    let free = services
        .availability
        .find_free(DEPT, monday(), "P6", Some("l"))
        .await
        .unwrap();
    // m co-teaches the lab, g and the others are free
    assert_eq!(ids(&free), vec!["f", "g", "h", "k"]);

    let created = services
        .negotiation
        .create_request(request("l", "g", "P6"))
        .await
        .unwrap();
    assert_eq!(created.subject_name, "OS Lab");
}

#[tokio::test]
async fn test_cancel_and_delete() {
    let services = seeded().await;
    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();

    assert!(matches!(
        services.negotiation.cancel(created.id, "g", None).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        services.negotiation.delete(created.id, "f").await,
        Err(AppError::Conflict(_))
    ));

    let cancelled = services
        .negotiation
        .cancel(created.id, "f", Some("back early".into()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, RequestStatus::Rejected);
    assert_eq!(
        cancelled.reason.as_deref(),
        Some("Cancelled by requester: back early")
    );

    // Repeated cancel is a no-op
    let again = services.negotiation.cancel(created.id, "f", None).await.unwrap();
    assert_eq!(again, cancelled);

    assert!(matches!(
        services.negotiation.respond(created.id, "g", Decision::Accept).await,
        Err(AppError::AlreadyResolved(_))
    ));

    for outsider in ["h", "g"] {
        assert!(matches!(
            services.negotiation.delete(created.id, outsider).await,
            Err(AppError::Forbidden(_))
        ));
    }
    services.negotiation.delete(created.id, "f").await.unwrap();
    // Repeated delete keeps the first timestamp
    services.negotiation.delete(created.id, "f").await.unwrap();

    assert!(services.negotiation.list_my_requests("f").await.unwrap().is_empty());
    assert!(services
        .negotiation
        .list_for_date(monday(), Some(DEPT.into()))
        .await
        .unwrap()
        .is_empty());
    // Still retrievable by id
    assert!(services.negotiation.get(created.id).await.unwrap().deleted_at.is_some());
}

#[tokio::test]
async fn test_deleted_accepted_request_keeps_slot() {
    let services = seeded().await;
    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    services
        .negotiation
        .respond(created.id, "g", Decision::Accept)
        .await
        .unwrap();
    assert!(matches!(
        services.negotiation.delete(created.id, "g").await,
        Err(AppError::Forbidden(_))
    ));
    // The substitute's attempt hides nothing from the requester
    assert_eq!(services.negotiation.list_my_requests("f").await.unwrap().len(), 1);

    services.negotiation.delete(created.id, "f").await.unwrap();
    assert!(services.negotiation.list_my_requests("f").await.unwrap().is_empty());

    // Still in effect, so the date listing keeps it
    let listed = services
        .negotiation
        .list_for_date(monday(), Some(DEPT.into()))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].status, RequestStatus::Accepted);

    let free = services
        .availability
        .find_free(DEPT, monday(), "P3", None)
        .await
        .unwrap();
    assert!(!ids(&free).contains(&"g"));

    let schedule = services
        .effective
        .resolve(ScheduleScope::Class { class: year2_a() }, monday())
        .await
        .unwrap();
    assert!(schedule
        .slots
        .iter()
        .any(|s| s.period_id == "P3" && s.faculty_id == "g"));
}

#[tokio::test]
async fn test_inbox_and_outbox_lists() {
    let services = seeded().await;
    let first = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = services
        .negotiation
        .create_request(request("k", "g", "P3"))
        .await
        .unwrap();

    let pending = services.negotiation.list_pending_for_substitute("g").await.unwrap();
    let pending_ids: Vec<_> = pending.iter().map(|r| r.id).collect();
    assert_eq!(pending_ids, vec![second.id, first.id]);

    services
        .negotiation
        .respond(first.id, "g", Decision::Reject)
        .await
        .unwrap();

    let pending = services.negotiation.list_pending_for_substitute("g").await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);

    let mine = services.negotiation.list_my_requests("f").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, RequestStatus::Rejected);
}

#[tokio::test]
async fn test_resolve_is_idempotent() {
    let services = seeded().await;
    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    services
        .negotiation
        .respond(created.id, "g", Decision::Accept)
        .await
        .unwrap();

    for scope in [
        ScheduleScope::Class { class: year2_a() },
        ScheduleScope::Faculty { faculty_id: "f".into() },
        ScheduleScope::Faculty { faculty_id: "g".into() },
    ] {
        let first = services.effective.resolve(scope.clone(), monday()).await.unwrap();
        let second = services.effective.resolve(scope, monday()).await.unwrap();
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_weekly_timetable_is_never_mutated() {
    let services = seeded().await;
    let before = serde_json::to_string(
        &services
            .timetable
            .entries_for_weekday(DEPT, DayOfWeek::Monday)
            .await
            .unwrap(),
    )
    .unwrap();

    let accepted = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    services
        .negotiation
        .respond(accepted.id, "g", Decision::Accept)
        .await
        .unwrap();
    let rejected = services
        .negotiation
        .create_request(request("l", "h", "P5"))
        .await
        .unwrap();
    services
        .negotiation
        .respond(rejected.id, "h", Decision::Reject)
        .await
        .unwrap();

    let after = serde_json::to_string(
        &services
            .timetable
            .entries_for_weekday(DEPT, DayOfWeek::Monday)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_leave_excludes_from_availability() {
    let services = seeded().await;

    let leave = services
        .leaves
        .apply(
            "h",
            rearrange_server::models::leave::ApplyLeave {
                start_date: monday(),
                end_date: monday() + chrono::Duration::days(2),
                reason: "Conference".into(),
            },
        )
        .await
        .unwrap();

    // Pending leave does not count
    let free = services
        .availability
        .find_free(DEPT, monday(), "P2", None)
        .await
        .unwrap();
    assert!(ids(&free).contains(&"h"));

    services
        .leaves
        .decide(leave.id, rearrange_server::models::LeaveStatus::Approved)
        .await
        .unwrap();

    let free = services
        .availability
        .find_free(DEPT, monday(), "P2", None)
        .await
        .unwrap();
    assert!(!ids(&free).contains(&"h"));
    assert!(services.leaves.is_on_approved_leave("h", monday()).await.unwrap());
}

#[tokio::test]
async fn test_sunday_resolves_to_empty_schedule() {
    let services = seeded().await;
    let schedule = services
        .effective
        .resolve(ScheduleScope::Faculty { faculty_id: "f".into() }, sunday())
        .await
        .unwrap();
    assert!(schedule.slots.is_empty());
    assert!(schedule.day_of_week.is_none());

    assert!(matches!(
        services.availability.find_free(DEPT, sunday(), "P1", None).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_events_are_published() {
    let services = seeded().await;
    let mut events = services.notifier.subscribe();

    let created = services
        .negotiation
        .create_request(request("f", "g", "P3"))
        .await
        .unwrap();
    services
        .negotiation
        .respond(created.id, "g", Decision::Accept)
        .await
        .unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.kind, EventKind::RequestCreated);
    assert_eq!(first.request_id, created.id);
    let second = events.recv().await.unwrap();
    assert_eq!(second.kind, EventKind::RequestAccepted);
}
