pub mod admin;
pub mod movies;
pub mod tickets;

use axum::{http::StatusCode, Router};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::error::BookingError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(movies::routes())
        .merge(tickets::routes())
        .merge(admin::routes())
}

/* ---------- helpers ---------- */

// Maps core errors onto transport status codes
pub(crate) fn error_response(err: BookingError) -> (StatusCode, String) {
    let status = match &err {
        BookingError::Validation(_) => StatusCode::BAD_REQUEST,
        BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
        BookingError::CapacityExceeded { .. } | BookingError::AlreadyExists { .. } => StatusCode::CONFLICT,
        BookingError::Store(e) if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
        BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("request failed: {:?}", err);
    }
    (status, err.to_string())
}

pub(crate) fn invalid_request(errors: ValidationErrors) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, errors.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn permanent_database_errors_are_not_unavailable() {
        let (status, _) = error_response(StoreError::Database(sqlx::Error::RowNotFound).into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = error_response(StoreError::Database(sqlx::Error::PoolTimedOut).into());
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
