use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::error_response;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{moviename}/booked/{theatre}", get(booked_info))
}

// GET /{moviename}/booked/{theatre}
async fn booked_info(
    State(state): State<Arc<AppState>>,
    Path((moviename, theatre)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let info = state
        .core
        .booked_info(&moviename, &theatre)
        .await
        .map_err(error_response)?;

    tracing::info!(
        "Booked info for {} at {}: {} booked, {} remaining, {}",
        moviename, theatre, info.booked, info.remaining, info.status
    );
    Ok((StatusCode::OK, Json(info)))
}
