//! Leave and absence endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        leave::{ApplyLeave, DecideLeave, MarkAbsent},
        LeaveRecord,
    },
    AppState,
};

use super::ActingFaculty;

/// Apply for leave as the acting faculty
#[utoipa::path(
    post,
    path = "/leaves",
    tag = "leaves",
    params(("X-Faculty-Id" = String, Header, description = "Acting faculty id")),
    request_body = ApplyLeave,
    responses(
        (status = 201, description = "Leave pending approval", body = LeaveRecord),
        (status = 400, description = "Invalid dates", body = crate::error::ErrorResponse),
        (status = 404, description = "Faculty not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn apply_leave(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
    Json(data): Json<ApplyLeave>,
) -> AppResult<(StatusCode, Json<LeaveRecord>)> {
    let record = state.services.leaves.apply(&acting, data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Approve or reject a pending leave
#[utoipa::path(
    put,
    path = "/leaves/{id}/decision",
    tag = "leaves",
    params(("id" = Uuid, Path, description = "Leave ID")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Leave decided", body = LeaveRecord),
        (status = 404, description = "Leave not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Leave already decided", body = crate::error::ErrorResponse)
    )
)]
pub async fn decide_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<DecideLeave>,
) -> AppResult<Json<LeaveRecord>> {
    let record = state.services.leaves.decide(id, data.status).await?;
    Ok(Json(record))
}

/// Mark the acting faculty absent for a whole day
#[utoipa::path(
    post,
    path = "/absences",
    tag = "leaves",
    params(("X-Faculty-Id" = String, Header, description = "Acting faculty id")),
    request_body = MarkAbsent,
    responses(
        (status = 200, description = "Day absence recorded", body = LeaveRecord),
        (status = 404, description = "Faculty not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_absent(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
    Json(data): Json<MarkAbsent>,
) -> AppResult<Json<LeaveRecord>> {
    let record = state.services.leaves.mark_absent(&acting, data.date).await?;
    Ok(Json(record))
}

/// Leaves and absences of a faculty member
#[utoipa::path(
    get,
    path = "/faculty/{id}/leaves",
    tag = "leaves",
    params(("id" = String, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Leave records", body = Vec<LeaveRecord>)
    )
)]
pub async fn list_leaves(
    State(state): State<AppState>,
    Path(faculty_id): Path<String>,
) -> AppResult<Json<Vec<LeaveRecord>>> {
    let records = state.services.leaves.list(&faculty_id).await?;
    Ok(Json(records))
}
