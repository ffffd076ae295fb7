//! Rearrangement request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        rearrangement::{
            CancelRearrangement, CreateRearrangement, RearrangementListQuery, RespondRearrangement,
        },
        RearrangementRequest,
    },
    AppState,
};

use super::ActingFaculty;

/// Ask a free colleague to cover one period
#[utoipa::path(
    post,
    path = "/rearrangements",
    tag = "rearrangements",
    params(("X-Faculty-Id" = String, Header, description = "Acting faculty id")),
    request_body = CreateRearrangement,
    responses(
        (status = 201, description = "Request created, pending", body = RearrangementRequest),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Faculty or class period not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Duplicate live request or substitute not free", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
    Json(mut data): Json<CreateRearrangement>,
) -> AppResult<(StatusCode, Json<RearrangementRequest>)> {
    if data.original_faculty_id.trim().is_empty() {
        data.original_faculty_id = acting;
    }

    let request = state.services.negotiation.create_request(data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Get a request by id
#[utoipa::path(
    get,
    path = "/rearrangements/{id}",
    tag = "rearrangements",
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = RearrangementRequest),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RearrangementRequest>> {
    let request = state.services.negotiation.get(id).await?;
    Ok(Json(request))
}

/// Substitute accepts or rejects a pending request
#[utoipa::path(
    post,
    path = "/rearrangements/{id}/respond",
    tag = "rearrangements",
    params(
        ("id" = Uuid, Path, description = "Request ID"),
        ("X-Faculty-Id" = String, Header, description = "Acting faculty id")
    ),
    request_body = RespondRearrangement,
    responses(
        (status = 200, description = "Request resolved", body = RearrangementRequest),
        (status = 403, description = "Caller is not the designated substitute", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already resolved, or substitute already booked", body = crate::error::ErrorResponse)
    )
)]
pub async fn respond(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
    Path(id): Path<Uuid>,
    Json(data): Json<RespondRearrangement>,
) -> AppResult<Json<RearrangementRequest>> {
    let request = state
        .services
        .negotiation
        .respond(id, &acting, data.decision)
        .await?;
    Ok(Json(request))
}

/// Requester withdraws a pending request
#[utoipa::path(
    post,
    path = "/rearrangements/{id}/cancel",
    tag = "rearrangements",
    params(
        ("id" = Uuid, Path, description = "Request ID"),
        ("X-Faculty-Id" = String, Header, description = "Acting faculty id")
    ),
    request_body(content = CancelRearrangement, description = "Optional reason"),
    responses(
        (status = 200, description = "Request cancelled, or already terminal", body = RearrangementRequest),
        (status = 403, description = "Caller is not the requester", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
    Path(id): Path<Uuid>,
    data: Option<Json<CancelRearrangement>>,
) -> AppResult<Json<RearrangementRequest>> {
    let reason = data.and_then(|Json(d)| d.reason);
    let request = state.services.negotiation.cancel(id, &acting, reason).await?;
    Ok(Json(request))
}

/// Remove a resolved request from the lists
#[utoipa::path(
    delete,
    path = "/rearrangements/{id}",
    tag = "rearrangements",
    params(
        ("id" = Uuid, Path, description = "Request ID"),
        ("X-Faculty-Id" = String, Header, description = "Acting faculty id")
    ),
    responses(
        (status = 204, description = "Request removed"),
        (status = 403, description = "Caller is not the requester", body = crate::error::ErrorResponse),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Request still pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_request(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.negotiation.delete(id, &acting).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Requests waiting for the caller's answer
#[utoipa::path(
    get,
    path = "/me/pending-requests",
    tag = "rearrangements",
    params(("X-Faculty-Id" = String, Header, description = "Acting faculty id")),
    responses(
        (status = 200, description = "Pending requests, newest first", body = Vec<RearrangementRequest>)
    )
)]
pub async fn list_pending_for_substitute(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
) -> AppResult<Json<Vec<RearrangementRequest>>> {
    let requests = state
        .services
        .negotiation
        .list_pending_for_substitute(&acting)
        .await?;
    Ok(Json(requests))
}

/// Requests raised by the caller
#[utoipa::path(
    get,
    path = "/me/requests",
    tag = "rearrangements",
    params(("X-Faculty-Id" = String, Header, description = "Acting faculty id")),
    responses(
        (status = 200, description = "Caller's requests, newest first", body = Vec<RearrangementRequest>)
    )
)]
pub async fn list_my_requests(
    State(state): State<AppState>,
    ActingFaculty(acting): ActingFaculty,
) -> AppResult<Json<Vec<RearrangementRequest>>> {
    let requests = state.services.negotiation.list_my_requests(&acting).await?;
    Ok(Json(requests))
}

/// Every request on a date
#[utoipa::path(
    get,
    path = "/rearrangements",
    tag = "rearrangements",
    params(RearrangementListQuery),
    responses(
        (status = 200, description = "Requests on the date, newest first", body = Vec<RearrangementRequest>)
    )
)]
pub async fn list_for_date(
    State(state): State<AppState>,
    Query(query): Query<RearrangementListQuery>,
) -> AppResult<Json<Vec<RearrangementRequest>>> {
    let requests = state
        .services
        .negotiation
        .list_for_date(query.date, query.department_id)
        .await?;
    Ok(Json(requests))
}
