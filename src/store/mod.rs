//! Persistence boundary of the booking core.
//!
//! Every lookup is keyed by [`InventoryKey`], so adapters only ever see the
//! case-normalized (movie, theatre) pair. The core serializes calls per key,
//! but a timed-out call may still complete in the store after the key is
//! released, so the capacity check and the ledger write of an admission
//! happen inside the store as one atomic step.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Booking, Inventory, InventoryKey};

pub mod memory;
pub mod postgres;

pub use memory::MemoryInventoryStore;
pub use postgres::PgInventoryStore;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn find_inventory(&self, key: &InventoryKey) -> Result<Option<Inventory>, StoreError>;

    /// Overwrites capacity and status of an existing inventory.
    async fn save_inventory(&self, inventory: &Inventory) -> Result<(), StoreError>;

    /// Returns `false` when an inventory with the same key already exists.
    async fn insert_inventory(&self, inventory: &Inventory) -> Result<bool, StoreError>;

    /// Returns `false` when nothing was deleted. Bookings are left untouched.
    async fn delete_inventory(&self, key: &InventoryKey) -> Result<bool, StoreError>;

    async fn list_inventories(&self) -> Result<Vec<Inventory>, StoreError>;

    /// Case-insensitive substring match on the movie name.
    async fn search_inventories(&self, fragment: &str) -> Result<Vec<Inventory>, StoreError>;

    /// Sum of seat counts over the whole ledger for `key`.
    async fn sum_booked_seats(&self, key: &InventoryKey) -> Result<i64, StoreError>;

    /// Records `booking` only if it still fits the inventory's capacity.
    /// The check and the write are atomic with respect to every other
    /// admission and capacity change on the same key.
    async fn admit_booking(&self, booking: &Booking) -> Result<Admission, StoreError>;
}

/// Outcome of [`InventoryStore::admit_booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected { available: i64 },
    Missing,
}

impl Admission {
    pub(crate) fn check(total_capacity: i32, booked: i64, requested: i32) -> Self {
        let capacity = i64::from(total_capacity);
        if booked + i64::from(requested) > capacity {
            Admission::Rejected {
                available: (capacity - booked).max(0),
            }
        } else {
            Admission::Admitted
        }
    }
}
