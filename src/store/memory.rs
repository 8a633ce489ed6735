use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::{Admission, InventoryStore};
use crate::error::StoreError;
use crate::models::{inventory::normalize, Booking, Inventory, InventoryKey};

/// In-process store used when no database is configured, and by tests.
///
/// `with_latency` delays every call to mimic a remote round trip, which
/// widens the window between reading the ledger and writing to it.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    inventories: RwLock<BTreeMap<InventoryKey, Inventory>>,
    bookings: RwLock<Vec<Booking>>,
    inventory_writes: AtomicUsize,
    booking_writes: AtomicUsize,
    unavailable: AtomicBool,
    latency: Option<Duration>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of inventory inserts and updates performed so far.
    pub fn inventory_writes(&self) -> usize {
        self.inventory_writes.load(Ordering::SeqCst)
    }

    pub fn booking_writes(&self) -> usize {
        self.booking_writes.load(Ordering::SeqCst)
    }

    pub async fn bookings_for(&self, key: &InventoryKey) -> Vec<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .filter(|b| &b.key() == key)
            .cloned()
            .collect()
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn find_inventory(&self, key: &InventoryKey) -> Result<Option<Inventory>, StoreError> {
        self.round_trip().await?;
        Ok(self.inventories.read().await.get(key).cloned())
    }

    async fn save_inventory(&self, inventory: &Inventory) -> Result<(), StoreError> {
        self.round_trip().await?;
        let mut inventories = self.inventories.write().await;
        if let Some(existing) = inventories.get_mut(&inventory.key()) {
            existing.total_capacity = inventory.total_capacity;
            existing.status = inventory.status;
            self.inventory_writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn insert_inventory(&self, inventory: &Inventory) -> Result<bool, StoreError> {
        self.round_trip().await?;
        let mut inventories = self.inventories.write().await;
        let key = inventory.key();
        if inventories.contains_key(&key) {
            return Ok(false);
        }
        inventories.insert(key, inventory.clone());
        self.inventory_writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn delete_inventory(&self, key: &InventoryKey) -> Result<bool, StoreError> {
        self.round_trip().await?;
        Ok(self.inventories.write().await.remove(key).is_some())
    }

    async fn list_inventories(&self) -> Result<Vec<Inventory>, StoreError> {
        self.round_trip().await?;
        let mut all: Vec<Inventory> = self.inventories.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            (&a.movie_name, &a.theatre_name).cmp(&(&b.movie_name, &b.theatre_name))
        });
        Ok(all)
    }

    async fn search_inventories(&self, fragment: &str) -> Result<Vec<Inventory>, StoreError> {
        let needle = normalize(fragment);
        let all = self.list_inventories().await?;
        Ok(all
            .into_iter()
            .filter(|inv| inv.key().movie().contains(&needle))
            .collect())
    }

    async fn sum_booked_seats(&self, key: &InventoryKey) -> Result<i64, StoreError> {
        self.round_trip().await?;
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| &b.key() == key)
            .map(|b| i64::from(b.seat_count))
            .sum())
    }

    async fn admit_booking(&self, booking: &Booking) -> Result<Admission, StoreError> {
        self.round_trip().await?;
        // lock order: inventories, then bookings
        let inventories = self.inventories.read().await;
        let key = booking.key();
        let Some(inventory) = inventories.get(&key) else {
            return Ok(Admission::Missing);
        };

        let mut bookings = self.bookings.write().await;
        let booked: i64 = bookings
            .iter()
            .filter(|b| b.key() == key)
            .map(|b| i64::from(b.seat_count))
            .sum();

        let admission = Admission::check(inventory.total_capacity, booked, booking.seat_count);
        if admission == Admission::Admitted {
            bookings.push(booking.clone());
            self.booking_writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(admission)
    }
}
