//! Free-faculty lookup

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::AvailabilityCandidate, AppState};

/// Slot to find substitutes for
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    pub department_id: String,
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
    pub period_id: String,
    /// Absent faculty, left out of the result
    pub exclude_faculty_id: Option<String>,
}

/// Faculty free to cover a period on a date
#[utoipa::path(
    get,
    path = "/availability",
    tag = "availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free faculty, sorted by name", body = Vec<AvailabilityCandidate>),
        (status = 400, description = "Sunday, break or unknown period", body = crate::error::ErrorResponse),
        (status = 503, description = "Storage unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn find_free(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<AvailabilityCandidate>>> {
    let candidates = state
        .services
        .availability
        .find_free(
            &query.department_id,
            query.date,
            &query.period_id,
            query.exclude_faculty_id.as_deref(),
        )
        .await?;
    Ok(Json(candidates))
}
