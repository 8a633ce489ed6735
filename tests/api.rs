mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::core_with;
use movie_booking::{
    build_router, config::Config, error::StartupError, store::MemoryInventoryStore, AppState,
};

const BASE: &str = "/api/v1.0/moviebooking";

fn app() -> Router {
    // no listener here; publishing to the closed queue only logs a warning
    let (core, _rx) = core_with(Arc::new(MemoryInventoryStore::new()));
    let config = Config::from_lookup(|_| None).unwrap();
    build_router(Arc::new(AppState { core, config }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn add_movie(app: &Router, movie: &str, theatre: &str, total: i32) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("{}/movies/add", BASE),
        Some(json!({ "movie_name": movie, "theatre_name": theatre, "total_tickets": total })),
    )
    .await
}

fn ticket_body(theatre: &str, seats: &[&str]) -> Value {
    json!({
        "theatre_name": theatre,
        "number_of_tickets": seats.len(),
        "seat_numbers": seats,
        "user_login_id": "jdoe",
    })
}

#[tokio::test]
async fn health_and_root_respond() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".into()));

    let (status, _) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn add_movie_then_duplicate_conflicts() {
    let app = app();
    let (status, body) = add_movie(&app, "Dune", "PVR", 10).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "BOOK_ASAP");
    assert_eq!(body["total_capacity"], 10);

    let (status, _) = add_movie(&app, "dune", "pvr", 5).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn add_movie_rejects_negative_tickets() {
    let app = app();
    let (status, _) = add_movie(&app, "Dune", "PVR", -1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_flow_over_http() {
    let app = app();
    add_movie(&app, "Dune", "PVR", 4).await;

    let (status, booking) = send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(ticket_body("PVR", &["A1", "A2", "A3"])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["seat_count"], 3);
    assert_eq!(booking["booked_by"], "jdoe");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(ticket_body("PVR", &["B1", "B2"])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, info) = send(&app, Method::GET, &format!("{}/Dune/booked/PVR", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info, json!({ "booked": 3, "remaining": 1, "status": "BOOK_ASAP" }));

    send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(ticket_body("PVR", &["B1"])),
    )
    .await;
    let (status, body) = send(&app, Method::PUT, &format!("{}/Dune/update/PVR", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "SOLD_OUT" }));
}

#[tokio::test]
async fn malformed_ticket_requests_are_bad_requests() {
    let app = app();
    add_movie(&app, "Dune", "PVR", 10).await;

    // no seats at all
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(json!({
            "theatre_name": "PVR",
            "number_of_tickets": 0,
            "seat_numbers": [],
            "user_login_id": "jdoe",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // count disagrees with the labels
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(json!({
            "theatre_name": "PVR",
            "number_of_tickets": 3,
            "seat_numbers": ["A1", "A2"],
            "user_login_id": "jdoe",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(ticket_body("PVR", &["A1", "A1"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_inventory_is_not_found() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{}/Ghost/add", BASE),
        Some(ticket_body("PVR", &["A1"])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, &format!("{}/Ghost/update/PVR", BASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &format!("{}/Ghost/booked/PVR", BASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("{}/Ghost/delete/PVR", BASE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn capacity_patch_recomputes_status() {
    let app = app();
    add_movie(&app, "Dune", "PVR", 5).await;
    send(
        &app,
        Method::POST,
        &format!("{}/Dune/add", BASE),
        Some(ticket_body("PVR", &["A1", "A2", "A3"])),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("{}/Dune/theatres/PVR/tickets?total=3", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_capacity"], 3);
    assert_eq!(body["status"], "SOLD_OUT");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("{}/Dune/theatres/PVR/tickets?total=-2", BASE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_search_and_delete() {
    let app = app();
    add_movie(&app, "Tenet", "PVR", 5).await;
    add_movie(&app, "Dune", "PVR", 5).await;
    add_movie(&app, "Dune", "INOX", 5).await;

    let (status, all) = send(&app, Method::GET, &format!("{}/all", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(all[0]["movie_name"], "Dune");
    assert_eq!(all[2]["movie_name"], "Tenet");

    let (status, hits) = send(&app, Method::GET, &format!("{}/movies/search/dun", BASE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::DELETE, &format!("{}/Dune/delete/INOX", BASE), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, all) = send(&app, Method::GET, &format!("{}/all", BASE), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn startup_reports_a_typed_redis_error() {
    let config = Config::from_lookup(|name| match name {
        "REDIS_URL" => Some("not-a-redis-url".to_string()),
        _ => None,
    })
    .unwrap();

    match AppState::build(config).await {
        Err(StartupError::Redis(_)) => {}
        Err(other) => panic!("unexpected startup error: {}", other),
        Ok(_) => panic!("startup should fail on a malformed REDIS_URL"),
    }
}
