use serde::{Deserialize, Serialize};

use super::inventory::Status;

/// Messages crossing the notification boundary between the booking
/// transaction and the status listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryEvent {
    BookingOccurred {
        movie_name: String,
        theatre_name: String,
        seat_count: i32,
    },
    StatusChanged {
        movie_name: String,
        theatre_name: String,
        status: Status,
    },
}

impl InventoryEvent {
    /// Redis channel the event is published on.
    pub fn topic(&self) -> &'static str {
        match self {
            InventoryEvent::BookingOccurred { .. } => "moviebooking.tickets",
            InventoryEvent::StatusChanged { .. } => "moviebooking.status",
        }
    }
}
