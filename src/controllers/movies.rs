use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::{error_response, invalid_request};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all", get(list_movies))
        .route("/movies/search/{moviename}", get(search_movies))
        .route("/movies/add", post(add_movie))
        .route("/{moviename}/theatres/{theatre}/tickets", patch(update_tickets))
        .route("/{moviename}/delete/{theatre}", delete(delete_movie))
}

// GET /all
async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let movies = state.core.list_movies().await.map_err(error_response)?;
    Ok((StatusCode::OK, Json(movies)))
}

// GET /movies/search/{moviename}
async fn search_movies(
    State(state): State<Arc<AppState>>,
    Path(moviename): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let movies = state.core.search_movies(&moviename).await.map_err(error_response)?;
    Ok((StatusCode::OK, Json(movies)))
}

// POST /movies/add
#[derive(Debug, Deserialize, Validate)]
struct AddMovieRequest {
    #[validate(length(min = 1, message = "movie name is required"))]
    movie_name: String,
    #[validate(length(min = 1, message = "theatre name is required"))]
    theatre_name: String,
    #[validate(range(min = 0, message = "total tickets must be non-negative"))]
    total_tickets: i32,
}

async fn add_movie(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMovieRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate().map_err(invalid_request)?;

    let movie = state
        .core
        .add_movie(&req.movie_name, &req.theatre_name, req.total_tickets)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(movie)))
}

// PATCH /{moviename}/theatres/{theatre}/tickets?total=N
#[derive(Debug, Deserialize)]
struct TotalQuery {
    total: i32,
}

async fn update_tickets(
    State(state): State<Arc<AppState>>,
    Path((moviename, theatre)): Path<(String, String)>,
    Query(params): Query<TotalQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let movie = state
        .core
        .set_capacity(&moviename, &theatre, params.total)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::OK, Json(movie)))
}

// DELETE /{moviename}/delete/{theatre}
async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path((moviename, theatre)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .core
        .delete_movie(&moviename, &theatre)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
