use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::inventory::InventoryKey;

/// Typed booking request handed to the core by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub movie_name: String,
    pub theatre_name: String,
    pub seat_count: i32,
    pub seat_labels: Vec<String>,
    pub requester: String,
}

/// Immutable ledger entry. Created only by a successful admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub movie_name: String,
    pub theatre_name: String,
    pub seat_count: i32,
    pub seat_labels: Vec<String>,
    pub booked_by: String,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub(crate) fn from_request(request: BookingRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            movie_name: request.movie_name,
            theatre_name: request.theatre_name,
            seat_count: request.seat_count,
            seat_labels: request.seat_labels,
            booked_by: request.requester,
            booked_at: Utc::now(),
        }
    }

    pub fn key(&self) -> InventoryKey {
        InventoryKey::new(&self.movie_name, &self.theatre_name)
    }
}
