use tracing::{info, warn};

use super::availability::compute_status;
use super::booking::BookingCore;
use crate::error::{BookingError, ValidationError};
use crate::models::{BookedInfo, Inventory, InventoryKey};

// Administrative operations on inventories. Writes go through the same
// per-key lock as bookings.
impl BookingCore {
    pub async fn add_movie(
        &self,
        movie_name: &str,
        theatre_name: &str,
        total_tickets: i32,
    ) -> Result<Inventory, BookingError> {
        if movie_name.trim().is_empty() {
            return Err(ValidationError::BlankField("movie name").into());
        }
        if theatre_name.trim().is_empty() {
            return Err(ValidationError::BlankField("theatre name").into());
        }
        if total_tickets < 0 {
            return Err(ValidationError::NegativeCapacity(total_tickets).into());
        }

        let key = InventoryKey::new(movie_name, theatre_name);
        let _guard = self.lock(&key).await?;

        // The ledger survives deletes, so a re-added movie starts from it.
        let booked = self.booked(&key).await?;
        let inventory = Inventory {
            movie_name: movie_name.trim().to_string(),
            theatre_name: theatre_name.trim().to_string(),
            total_capacity: total_tickets,
            status: compute_status(total_tickets, booked).status,
        };

        let inserted = self
            .timed("insert_inventory", self.store.insert_inventory(&inventory))
            .await?;
        if !inserted {
            warn!("Movie {} already exists", key);
            return Err(BookingError::AlreadyExists {
                movie: inventory.movie_name,
                theatre: inventory.theatre_name,
            });
        }

        info!(
            "Movie added: {} at {} with {} tickets ({})",
            inventory.movie_name, inventory.theatre_name, inventory.total_capacity, inventory.status
        );
        Ok(inventory)
    }

    pub async fn delete_movie(&self, movie_name: &str, theatre_name: &str) -> Result<(), BookingError> {
        let key = InventoryKey::new(movie_name, theatre_name);
        let _guard = self.lock(&key).await?;

        let deleted = self
            .timed("delete_inventory", self.store.delete_inventory(&key))
            .await?;
        if !deleted {
            warn!("No movie to delete for {}", key);
            return Err(BookingError::not_found(movie_name, theatre_name));
        }

        info!("Movie deleted: {}", key);
        Ok(())
    }

    pub async fn list_movies(&self) -> Result<Vec<Inventory>, BookingError> {
        let movies = self
            .timed("list_inventories", self.store.list_inventories())
            .await?;
        info!("Retrieved {} movies", movies.len());
        Ok(movies)
    }

    pub async fn search_movies(&self, fragment: &str) -> Result<Vec<Inventory>, BookingError> {
        let movies = self
            .timed("search_inventories", self.store.search_inventories(fragment))
            .await?;
        info!("Found {} movies matching '{}'", movies.len(), fragment);
        Ok(movies)
    }

    /// Live figures straight from the ledger; ignores the stored status.
    pub async fn booked_info(&self, movie_name: &str, theatre_name: &str) -> Result<BookedInfo, BookingError> {
        let key = InventoryKey::new(movie_name, theatre_name);
        let inventory = self.load(&key, movie_name, theatre_name).await?;
        let booked = self.booked(&key).await?;
        let availability = compute_status(inventory.total_capacity, booked);

        Ok(BookedInfo {
            booked,
            remaining: availability.remaining,
            status: availability.status,
        })
    }
}
