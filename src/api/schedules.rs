//! Effective schedule endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{effective::EffectiveScheduleQuery, ClassKey, EffectiveSchedule, ScheduleScope},
    AppState,
};

/// Class and date to resolve
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ClassScheduleQuery {
    pub department_id: String,
    pub year: i16,
    pub semester: i16,
    pub section: String,
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// A faculty member's schedule on a date, substitutions included
#[utoipa::path(
    get,
    path = "/schedules/faculty/{id}",
    tag = "schedules",
    params(
        ("id" = String, Path, description = "Faculty ID"),
        EffectiveScheduleQuery
    ),
    responses(
        (status = 200, description = "Effective schedule", body = EffectiveSchedule)
    )
)]
pub async fn faculty_schedule(
    State(state): State<AppState>,
    Path(faculty_id): Path<String>,
    Query(query): Query<EffectiveScheduleQuery>,
) -> AppResult<Json<EffectiveSchedule>> {
    let schedule = state
        .services
        .effective
        .resolve(ScheduleScope::Faculty { faculty_id }, query.date)
        .await?;
    Ok(Json(schedule))
}

/// A class's schedule on a date, substitutions included
#[utoipa::path(
    get,
    path = "/schedules/class",
    tag = "schedules",
    params(ClassScheduleQuery),
    responses(
        (status = 200, description = "Effective schedule", body = EffectiveSchedule)
    )
)]
pub async fn class_schedule(
    State(state): State<AppState>,
    Query(query): Query<ClassScheduleQuery>,
) -> AppResult<Json<EffectiveSchedule>> {
    let class = ClassKey {
        department_id: query.department_id,
        year: query.year,
        semester: query.semester,
        section: query.section,
    };
    let schedule = state
        .services
        .effective
        .resolve(ScheduleScope::Class { class }, query.date)
        .await?;
    Ok(Json(schedule))
}
