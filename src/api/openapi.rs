//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    availability, faculty, health, leaves, notifications, rearrangements, schedules, timetable,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rearrangement API",
        version = "1.0.0",
        description = "Faculty absence and substitution rearrangement REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Availability
        availability::find_free,
        // Rearrangements
        rearrangements::create_request,
        rearrangements::get_request,
        rearrangements::respond,
        rearrangements::cancel,
        rearrangements::delete_request,
        rearrangements::list_pending_for_substitute,
        rearrangements::list_my_requests,
        rearrangements::list_for_date,
        // Schedules
        schedules::faculty_schedule,
        schedules::class_schedule,
        // Timetable
        timetable::list_periods,
        timetable::publish_class_timetable,
        timetable::get_class_timetable,
        timetable::entries_for_weekday,
        timetable::entries_for_faculty,
        // Faculty
        faculty::list_faculty,
        faculty::get_faculty,
        faculty::upsert_faculty,
        // Leaves
        leaves::apply_leave,
        leaves::decide_leave,
        leaves::mark_absent,
        leaves::list_leaves,
        // Notifications
        notifications::stream,
    ),
    components(
        schemas(
            // Availability
            availability::AvailabilityQuery,
            crate::models::AvailabilityCandidate,
            // Rearrangements
            crate::models::RearrangementRequest,
            crate::models::rearrangement::CreateRearrangement,
            crate::models::rearrangement::RespondRearrangement,
            crate::models::rearrangement::CancelRearrangement,
            crate::models::rearrangement::RearrangementListQuery,
            crate::models::RequestStatus,
            crate::models::Decision,
            // Schedules
            schedules::ClassScheduleQuery,
            crate::models::EffectiveSchedule,
            crate::models::EffectiveSlot,
            crate::models::ScheduleScope,
            crate::models::SlotStatus,
            crate::models::effective::SubstitutionInfo,
            crate::models::effective::EffectiveScheduleQuery,
            // Timetable
            timetable::WeekdayQuery,
            timetable::DayQuery,
            crate::models::timetable::PeriodDefinition,
            crate::models::timetable::PublishTimetable,
            crate::models::timetable::PublishedEntry,
            crate::models::WeeklyScheduleEntry,
            crate::models::ClassKey,
            crate::models::DayOfWeek,
            crate::models::SubjectType,
            // Faculty
            faculty::FacultyQuery,
            crate::models::Faculty,
            crate::models::faculty::UpsertFaculty,
            // Leaves
            crate::models::LeaveRecord,
            crate::models::LeaveKind,
            crate::models::LeaveStatus,
            crate::models::leave::ApplyLeave,
            crate::models::leave::DecideLeave,
            crate::models::leave::MarkAbsent,
            // Notifications
            notifications::StreamQuery,
            crate::services::notifications::RearrangementEvent,
            crate::services::notifications::EventKind,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "availability", description = "Free faculty lookup"),
        (name = "rearrangements", description = "Substitution requests and their negotiation"),
        (name = "schedules", description = "Effective schedules for a date"),
        (name = "timetable", description = "Weekly timetable"),
        (name = "faculty", description = "Faculty directory"),
        (name = "leaves", description = "Leaves and day absences"),
        (name = "notifications", description = "Live rearrangement events")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
