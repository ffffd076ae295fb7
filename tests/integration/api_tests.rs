//! HTTP tests driving the router in-process

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use rearrange_server::{api::create_router, config::AppConfig, AppState};

use crate::common::seeded;

async fn app() -> Router {
    create_router(AppState::new(AppConfig::default(), seeded().await))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_as(uri: &str, faculty_id: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .header("x-faculty-id", faculty_id)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get("/api/v1/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_full_negotiation_over_http() {
    let app = app().await;

    let (status, body) = send(
        &app,
        get("/api/v1/availability?department_id=cse&date=2026-10-19&period_id=P3&exclude_faculty_id=f"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "g");

    let (status, created) = send(
        &app,
        post_as(
            "/api/v1/rearrangements",
            "f",
            json!({
                "date": "2026-10-19",
                "period_id": "P3",
                "department_id": "cse",
                "substitute_faculty_id": "g"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["original_faculty_id"], "f");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, inbox) = send(
        &app,
        Request::get("/api/v1/me/pending-requests")
            .header("x-faculty-id", "g")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(inbox.as_array().unwrap().len(), 1);

    // Wrong responder
    let (status, body) = send(
        &app,
        post_as(
            &format!("/api/v1/rearrangements/{}/respond", id),
            "h",
            json!({ "decision": "accept" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, body) = send(
        &app,
        post_as(
            &format!("/api/v1/rearrangements/{}/respond", id),
            "g",
            json!({ "decision": "accept" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (status, body) = send(
        &app,
        post_as(
            &format!("/api/v1/rearrangements/{}/respond", id),
            "g",
            json!({ "decision": "reject" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyResolved");

    let (status, schedule) = send(
        &app,
        get("/api/v1/schedules/class?department_id=cse&year=2&semester=3&section=A&date=2026-10-19"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let p3 = schedule["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["period_id"] == "P3")
        .unwrap()
        .clone();
    assert_eq!(p3["faculty_id"], "g");
    assert_eq!(p3["status"], "substituted");

    let (status, schedule) = send(&app, get("/api/v1/schedules/faculty/g?date=2026-10-19")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["slots"][0]["display"], "covering F for Data Structures, Year2-A");
}

#[tokio::test]
async fn test_missing_identity_header_is_bad_request() {
    let app = app().await;

    let request = Request::post("/api/v1/rearrangements")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "date": "2026-10-19",
                "period_id": "P3",
                "department_id": "cse",
                "substitute_faculty_id": "g"
            })
            .to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_error_mapping() {
    let app = app().await;

    // Sunday
    let (status, _) = send(
        &app,
        get("/api/v1/availability?department_id=cse&date=2026-10-25&period_id=P3"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        get("/api/v1/rearrangements/5f0c7c3e-8d36-4c38-9a57-2f7e0c1a9b11"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");

    // k teaches P3, not a free candidate
    let (status, body) = send(
        &app,
        post_as(
            "/api/v1/rearrangements",
            "f",
            json!({
                "date": "2026-10-19",
                "period_id": "P3",
                "department_id": "cse",
                "substitute_faculty_id": "k"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CandidateUnavailable");
}

#[tokio::test]
async fn test_cancel_then_delete_over_http() {
    let app = app().await;

    let (_, created) = send(
        &app,
        post_as(
            "/api/v1/rearrangements",
            "f",
            json!({
                "date": "2026-10-19",
                "period_id": "P3",
                "department_id": "cse",
                "substitute_faculty_id": "h"
            }),
        ),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_as(&format!("/api/v1/rearrangements/{}/cancel", id), "f", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let delete = Request::delete(format!("/api/v1/rearrangements/{}", id))
        .header("x-faculty-id", "f")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, listed) = send(&app, get("/api/v1/rearrangements?date=2026-10-19")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}
