//! Weekly timetable endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        timetable::{PeriodDefinition, PublishTimetable},
        ClassKey, DayOfWeek, WeeklyScheduleEntry,
    },
    AppState,
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WeekdayQuery {
    pub department_id: String,
    pub day: DayOfWeek,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DayQuery {
    pub day: DayOfWeek,
}

/// The configured daily period grid
#[utoipa::path(
    get,
    path = "/timetable/periods",
    tag = "timetable",
    responses(
        (status = 200, description = "Periods in day order", body = Vec<PeriodDefinition>)
    )
)]
pub async fn list_periods(State(state): State<AppState>) -> Json<Vec<PeriodDefinition>> {
    Json(state.services.timetable.grid().periods().to_vec())
}

/// Replace a class's weekly timetable
#[utoipa::path(
    put,
    path = "/timetable/class",
    tag = "timetable",
    params(ClassKey),
    request_body = PublishTimetable,
    responses(
        (status = 200, description = "Published entries", body = Vec<WeeklyScheduleEntry>),
        (status = 400, description = "Overlapping entries or unknown period", body = crate::error::ErrorResponse)
    )
)]
pub async fn publish_class_timetable(
    State(state): State<AppState>,
    Query(class): Query<ClassKey>,
    Json(data): Json<PublishTimetable>,
) -> AppResult<Json<Vec<WeeklyScheduleEntry>>> {
    let entries = state.services.timetable.publish_class(class, data).await?;
    Ok(Json(entries))
}

/// A class's weekly timetable
#[utoipa::path(
    get,
    path = "/timetable/class",
    tag = "timetable",
    params(ClassKey),
    responses(
        (status = 200, description = "Class entries", body = Vec<WeeklyScheduleEntry>)
    )
)]
pub async fn get_class_timetable(
    State(state): State<AppState>,
    Query(class): Query<ClassKey>,
) -> AppResult<Json<Vec<WeeklyScheduleEntry>>> {
    let entries = state.services.timetable.get_class(&class).await?;
    Ok(Json(entries))
}

/// Every entry of a department on a weekday
#[utoipa::path(
    get,
    path = "/timetable/weekday",
    tag = "timetable",
    params(WeekdayQuery),
    responses(
        (status = 200, description = "Department entries", body = Vec<WeeklyScheduleEntry>)
    )
)]
pub async fn entries_for_weekday(
    State(state): State<AppState>,
    Query(query): Query<WeekdayQuery>,
) -> AppResult<Json<Vec<WeeklyScheduleEntry>>> {
    let entries = state
        .services
        .timetable
        .entries_for_weekday(&query.department_id, query.day)
        .await?;
    Ok(Json(entries))
}

/// A faculty member's weekly entries on a weekday
#[utoipa::path(
    get,
    path = "/timetable/faculty/{id}",
    tag = "timetable",
    params(
        ("id" = String, Path, description = "Faculty ID"),
        DayQuery
    ),
    responses(
        (status = 200, description = "Faculty entries", body = Vec<WeeklyScheduleEntry>)
    )
)]
pub async fn entries_for_faculty(
    State(state): State<AppState>,
    Path(faculty_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<Vec<WeeklyScheduleEntry>>> {
    let entries = state
        .services
        .timetable
        .entries_for_faculty(&faculty_id, query.day)
        .await?;
    Ok(Json(entries))
}
