//! Booking core: admission of bookings against seat capacity and
//! maintenance of the derived availability status.
//!
//! Every read-compare-write on an inventory runs while holding that
//! inventory's [`KeyedLocks`] slot. Admission itself is a single atomic
//! store call ([`InventoryStore::admit_booking`]), so two bookings for the
//! same movie and theatre can never both pass the capacity check on the same
//! ledger snapshot, even when one of them timed out on the caller's side.
//! The booked total is always summed from the ledger; nothing caches it.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::availability::compute_status;
use super::locks::{KeyGuard, KeyedLocks};
use crate::config::BookingConfig;
use crate::error::{BookingError, StoreError, ValidationError};
use crate::models::{Booking, BookingRequest, Inventory, InventoryEvent, InventoryKey, Status};
use crate::notify::NotificationPort;
use crate::store::{Admission, InventoryStore};

pub struct BookingCore {
    pub(super) store: Arc<dyn InventoryStore>,
    notifier: Arc<dyn NotificationPort>,
    locks: KeyedLocks,
    store_timeout: Duration,
    notify_timeout: Duration,
}

impl BookingCore {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        notifier: Arc<dyn NotificationPort>,
        config: &BookingConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            locks: KeyedLocks::new(),
            store_timeout: config.store_timeout,
            notify_timeout: config.notify_timeout,
        }
    }

    /// Validates, admits and records a booking, then announces it.
    ///
    /// The announcement happens after the lock is released and its failure
    /// is only logged: the booking is already durable at that point.
    pub async fn book_seats(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        debug!(
            "Booking request: movie={} theatre={} seats={} by={}",
            request.movie_name, request.theatre_name, request.seat_count, request.requester
        );
        validate_request(&request)?;

        let key = InventoryKey::new(&request.movie_name, &request.theatre_name);
        let guard = self.lock(&key).await?;

        let inventory = self.load(&key, &request.movie_name, &request.theatre_name).await?;
        let booking = Booking::from_request(request);

        // The store re-checks capacity in the same atomic step as the write,
        // so a call that outlives its timeout cannot oversell once the key
        // is released.
        match self.timed("admit_booking", self.store.admit_booking(&booking)).await? {
            Admission::Admitted => {}
            Admission::Rejected { available } => {
                warn!(
                    "Not enough tickets for {}: requested {}, available {}",
                    key, booking.seat_count, available
                );
                return Err(BookingError::CapacityExceeded {
                    requested: booking.seat_count,
                    available,
                });
            }
            Admission::Missing => {
                warn!("Inventory removed before admission: {}", key);
                return Err(BookingError::not_found(&booking.movie_name, &booking.theatre_name));
            }
        }
        drop(guard);

        info!(
            "Booking {} accepted: {} seats for {} at {} by {}",
            booking.id, booking.seat_count, inventory.movie_name, inventory.theatre_name, booking.booked_by
        );

        self.emit(InventoryEvent::BookingOccurred {
            movie_name: inventory.movie_name,
            theatre_name: inventory.theatre_name,
            seat_count: booking.seat_count,
        })
        .await;

        Ok(booking)
    }

    /// Recomputes the status from the ledger and stores it if it changed.
    pub async fn recompute_status(&self, movie_name: &str, theatre_name: &str) -> Result<Status, BookingError> {
        let key = InventoryKey::new(movie_name, theatre_name);
        let _guard = self.lock(&key).await?;

        let mut inventory = self.load(&key, movie_name, theatre_name).await?;
        let booked = self.booked(&key).await?;
        let availability = compute_status(inventory.total_capacity, booked);

        if inventory.status == availability.status {
            debug!("Status for {} unchanged: {}", key, availability.status);
            return Ok(availability.status);
        }

        let previous = inventory.status;
        inventory.status = availability.status;
        self.timed("save_inventory", self.store.save_inventory(&inventory)).await?;
        info!(
            "Status for {} changed {} -> {} ({} remaining)",
            key, previous, availability.status, availability.remaining
        );
        Ok(availability.status)
    }

    /// Replaces the total capacity and stores the matching status in the
    /// same write.
    pub async fn set_capacity(
        &self,
        movie_name: &str,
        theatre_name: &str,
        new_total: i32,
    ) -> Result<Inventory, BookingError> {
        if new_total < 0 {
            warn!("Rejected negative capacity {} for {} at {}", new_total, movie_name, theatre_name);
            return Err(ValidationError::NegativeCapacity(new_total).into());
        }

        let key = InventoryKey::new(movie_name, theatre_name);
        let _guard = self.lock(&key).await?;

        let mut inventory = self.load(&key, movie_name, theatre_name).await?;
        let booked = self.booked(&key).await?;
        let availability = compute_status(new_total, booked);

        inventory.total_capacity = new_total;
        inventory.status = availability.status;
        self.timed("save_inventory", self.store.save_inventory(&inventory)).await?;

        info!(
            "Capacity for {} set to {} ({} booked, status {})",
            key, new_total, booked, inventory.status
        );
        Ok(inventory)
    }

    /// Upper bound for a single event publish.
    pub fn notify_timeout(&self) -> Duration {
        self.notify_timeout
    }

    pub(super) async fn lock(&self, key: &InventoryKey) -> Result<KeyGuard, StoreError> {
        self.locks.acquire(key, self.store_timeout).await
    }

    pub(super) async fn load(
        &self,
        key: &InventoryKey,
        movie_name: &str,
        theatre_name: &str,
    ) -> Result<Inventory, BookingError> {
        self.timed("find_inventory", self.store.find_inventory(key))
            .await?
            .ok_or_else(|| {
                warn!("Inventory not found: {}", key);
                BookingError::not_found(movie_name, theatre_name)
            })
    }

    pub(super) async fn booked(&self, key: &InventoryKey) -> Result<i64, StoreError> {
        self.timed("sum_booked_seats", self.store.sum_booked_seats(key)).await
    }

    /// Runs one store call under the configured timeout.
    pub(super) async fn timed<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Store call {} timed out after {:?}", operation, self.store_timeout);
                Err(StoreError::Timeout {
                    operation,
                    after: self.store_timeout,
                })
            }
        }
    }

    async fn emit(&self, event: InventoryEvent) {
        match tokio::time::timeout(self.notify_timeout, self.notifier.publish(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to publish booking event: {}", e),
            Err(_) => warn!("Publishing booking event timed out after {:?}", self.notify_timeout),
        }
    }
}

/// Checks a booking request before any store access. Each rule is reported
/// with its own error variant.
pub fn validate_request(request: &BookingRequest) -> Result<(), ValidationError> {
    for (field, value) in [
        ("movie name", &request.movie_name),
        ("theatre name", &request.theatre_name),
        ("requester", &request.requester),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::BlankField(field));
        }
    }

    if request.seat_count <= 0 {
        return Err(ValidationError::NonPositiveSeatCount(request.seat_count));
    }
    if request.seat_labels.is_empty() {
        return Err(ValidationError::MissingSeatLabels);
    }
    if request.seat_labels.len() != request.seat_count as usize {
        return Err(ValidationError::SeatCountMismatch {
            seat_count: request.seat_count,
            labels: request.seat_labels.len(),
        });
    }

    let mut seen = HashSet::with_capacity(request.seat_labels.len());
    for label in &request.seat_labels {
        if !seen.insert(label.as_str()) {
            return Err(ValidationError::DuplicateSeatLabel(label.clone()));
        }
    }
    Ok(())
}
