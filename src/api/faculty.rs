//! Faculty directory endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{faculty::UpsertFaculty, Faculty},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct FacultyQuery {
    pub department_id: String,
}

/// Faculty of a department
#[utoipa::path(
    get,
    path = "/faculty",
    tag = "faculty",
    params(FacultyQuery),
    responses(
        (status = 200, description = "Department faculty", body = Vec<Faculty>)
    )
)]
pub async fn list_faculty(
    State(state): State<AppState>,
    Query(query): Query<FacultyQuery>,
) -> AppResult<Json<Vec<Faculty>>> {
    let faculty = state.services.faculty.list(&query.department_id).await?;
    Ok(Json(faculty))
}

/// Get a faculty member
#[utoipa::path(
    get,
    path = "/faculty/{id}",
    tag = "faculty",
    params(("id" = String, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty details", body = Faculty),
        (status = 404, description = "Faculty not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_faculty(
    State(state): State<AppState>,
    Path(faculty_id): Path<String>,
) -> AppResult<Json<Faculty>> {
    let faculty = state.services.faculty.get(&faculty_id).await?;
    Ok(Json(faculty))
}

/// Create or update a faculty member
#[utoipa::path(
    put,
    path = "/faculty/{id}",
    tag = "faculty",
    params(("id" = String, Path, description = "Faculty ID")),
    request_body = UpsertFaculty,
    responses(
        (status = 200, description = "Faculty saved", body = Faculty),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse)
    )
)]
pub async fn upsert_faculty(
    State(state): State<AppState>,
    Path(faculty_id): Path<String>,
    Json(data): Json<UpsertFaculty>,
) -> AppResult<Json<Faculty>> {
    let faculty = state.services.faculty.upsert(&faculty_id, data).await?;
    Ok(Json(faculty))
}
