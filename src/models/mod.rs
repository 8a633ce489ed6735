pub mod inventory;
pub mod booking;
pub mod event;

pub use inventory::{BookedInfo, Inventory, InventoryKey, Status};
pub use booking::{Booking, BookingRequest};
pub use event::InventoryEvent;
