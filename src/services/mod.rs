pub mod availability;
pub mod booking;
pub mod catalog;
pub mod locks;

pub use availability::{compute_status, Availability};
pub use booking::{validate_request, BookingCore};
