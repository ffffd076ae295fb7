//! API handlers for the rearrangement REST endpoints

pub mod availability;
pub mod faculty;
pub mod health;
pub mod leaves;
pub mod notifications;
pub mod openapi;
pub mod rearrangements;
pub mod schedules;
pub mod timetable;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, AppState};

/// Header carrying the acting faculty id, set by the upstream gateway
pub const FACULTY_ID_HEADER: &str = "x-faculty-id";

/// Extractor for the faculty member on whose behalf the call is made
pub struct ActingFaculty(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ActingFaculty
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let faculty_id = parts
            .headers
            .get(FACULTY_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing X-Faculty-Id header".to_string()))?;

        Ok(ActingFaculty(faculty_id.to_string()))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Availability
        .route("/availability", get(availability::find_free))
        // Rearrangements
        .route("/rearrangements", get(rearrangements::list_for_date))
        .route("/rearrangements", post(rearrangements::create_request))
        .route("/rearrangements/:id", get(rearrangements::get_request))
        .route("/rearrangements/:id", delete(rearrangements::delete_request))
        .route("/rearrangements/:id/respond", post(rearrangements::respond))
        .route("/rearrangements/:id/cancel", post(rearrangements::cancel))
        .route("/me/pending-requests", get(rearrangements::list_pending_for_substitute))
        .route("/me/requests", get(rearrangements::list_my_requests))
        // Effective schedules
        .route("/schedules/faculty/:id", get(schedules::faculty_schedule))
        .route("/schedules/class", get(schedules::class_schedule))
        // Weekly timetable
        .route("/timetable/class", get(timetable::get_class_timetable))
        .route("/timetable/class", put(timetable::publish_class_timetable))
        .route("/timetable/weekday", get(timetable::entries_for_weekday))
        .route("/timetable/faculty/:id", get(timetable::entries_for_faculty))
        .route("/timetable/periods", get(timetable::list_periods))
        // Faculty directory
        .route("/faculty", get(faculty::list_faculty))
        .route("/faculty/:id", get(faculty::get_faculty))
        .route("/faculty/:id", put(faculty::upsert_faculty))
        .route("/faculty/:id/leaves", get(leaves::list_leaves))
        // Leaves and absences
        .route("/leaves", post(leaves::apply_leave))
        .route("/leaves/:id/decision", put(leaves::decide_leave))
        .route("/absences", post(leaves::mark_absent))
        // Notifications
        .route("/notifications/stream", get(notifications::stream))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
