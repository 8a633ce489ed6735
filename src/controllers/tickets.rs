use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{error_response, invalid_request};
use crate::models::BookingRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{moviename}/add", post(book_tickets))
        .route("/{moviename}/update/{theatre}", put(update_status))
}

/* ---------- BOOKINGS ---------- */

// POST /{moviename}/add
#[derive(Debug, Deserialize, Validate)]
struct TicketRequest {
    #[validate(length(min = 1, message = "theatre name is required"))]
    theatre_name: String,
    #[validate(range(min = 1, message = "number of tickets must be positive"))]
    number_of_tickets: i32,
    #[validate(length(min = 1, message = "seat numbers must be provided"))]
    seat_numbers: Vec<String>,
    #[validate(length(min = 1, message = "user login id is required"))]
    user_login_id: String,
}

async fn book_tickets(
    State(state): State<Arc<AppState>>,
    Path(moviename): Path<String>,
    Json(req): Json<TicketRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate().map_err(invalid_request)?;

    let booking = state
        .core
        .book_seats(BookingRequest {
            movie_name: moviename,
            theatre_name: req.theatre_name,
            seat_count: req.number_of_tickets,
            seat_labels: req.seat_numbers,
            requester: req.user_login_id,
        })
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/* ---------- STATUS ---------- */

// PUT /{moviename}/update/{theatre}
async fn update_status(
    State(state): State<Arc<AppState>>,
    Path((moviename, theatre)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let status = state
        .core
        .recompute_status(&moviename, &theatre)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "status": status }))))
}
