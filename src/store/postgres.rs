use async_trait::async_trait;
use sqlx::FromRow;
use tracing::debug;

use super::{Admission, InventoryStore};
use crate::database::Database;
use crate::error::StoreError;
use crate::models::{inventory::normalize, Booking, Inventory, InventoryKey, Status};

/// Admission locks the `movies` row (`FOR UPDATE`) for the length of its
/// transaction, so it stays serialized across API replicas sharing one
/// database and against concurrent capacity updates.
#[derive(Clone)]
pub struct PgInventoryStore {
    db: Database,
}

impl PgInventoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct MovieRow {
    movie_name: String,
    theatre_name: String,
    total_tickets: i32,
    status: String,
}

impl TryFrom<MovieRow> for Inventory {
    type Error = StoreError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        let status: Status = row
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("{}", e)))?;
        Ok(Inventory {
            movie_name: row.movie_name,
            theatre_name: row.theatre_name,
            total_capacity: row.total_tickets,
            status,
        })
    }
}

fn into_inventories(rows: Vec<MovieRow>) -> Result<Vec<Inventory>, StoreError> {
    rows.into_iter().map(Inventory::try_from).collect()
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn find_inventory(&self, key: &InventoryKey) -> Result<Option<Inventory>, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT movie_name, theatre_name, total_tickets, status
             FROM movies
             WHERE movie_key = $1 AND theatre_key = $2"
        )
        .bind(key.movie())
        .bind(key.theatre())
        .fetch_optional(&self.db.pool)
        .await?;

        row.map(Inventory::try_from).transpose()
    }

    async fn save_inventory(&self, inventory: &Inventory) -> Result<(), StoreError> {
        let key = inventory.key();
        let result = sqlx::query(
            "UPDATE movies
             SET total_tickets = $3, status = $4, updated_at = NOW()
             WHERE movie_key = $1 AND theatre_key = $2"
        )
        .bind(key.movie())
        .bind(key.theatre())
        .bind(inventory.total_capacity)
        .bind(inventory.status.as_str())
        .execute(&self.db.pool)
        .await?;

        debug!("save_inventory {}: {} rows", key, result.rows_affected());
        Ok(())
    }

    async fn insert_inventory(&self, inventory: &Inventory) -> Result<bool, StoreError> {
        let key = inventory.key();
        let result = sqlx::query(
            "INSERT INTO movies (movie_name, theatre_name, movie_key, theatre_key, total_tickets, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (movie_key, theatre_key) DO NOTHING"
        )
        .bind(&inventory.movie_name)
        .bind(&inventory.theatre_name)
        .bind(key.movie())
        .bind(key.theatre())
        .bind(inventory.total_capacity)
        .bind(inventory.status.as_str())
        .execute(&self.db.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_inventory(&self, key: &InventoryKey) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM movies WHERE movie_key = $1 AND theatre_key = $2")
            .bind(key.movie())
            .bind(key.theatre())
            .execute(&self.db.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_inventories(&self) -> Result<Vec<Inventory>, StoreError> {
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT movie_name, theatre_name, total_tickets, status
             FROM movies
             ORDER BY movie_name, theatre_name"
        )
        .fetch_all(&self.db.pool)
        .await?;

        into_inventories(rows)
    }

    async fn search_inventories(&self, fragment: &str) -> Result<Vec<Inventory>, StoreError> {
        // strpos keeps % and _ in user input literal
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT movie_name, theatre_name, total_tickets, status
             FROM movies
             WHERE strpos(movie_key, $1) > 0
             ORDER BY movie_name, theatre_name"
        )
        .bind(normalize(fragment))
        .fetch_all(&self.db.pool)
        .await?;

        into_inventories(rows)
    }

    async fn sum_booked_seats(&self, key: &InventoryKey) -> Result<i64, StoreError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(num_tickets), 0)::BIGINT
             FROM tickets
             WHERE movie_key = $1 AND theatre_key = $2"
        )
        .bind(key.movie())
        .bind(key.theatre())
        .fetch_one(&self.db.pool)
        .await?;

        Ok(total)
    }

    async fn admit_booking(&self, booking: &Booking) -> Result<Admission, StoreError> {
        let key = booking.key();
        let mut tx = self.db.pool.begin().await?;

        let total = sqlx::query_scalar::<_, i32>(
            "SELECT total_tickets
             FROM movies
             WHERE movie_key = $1 AND theatre_key = $2
             FOR UPDATE"
        )
        .bind(key.movie())
        .bind(key.theatre())
        .fetch_optional(&mut *tx)
        .await?;

        // dropping the transaction rolls it back
        let Some(total) = total else {
            return Ok(Admission::Missing);
        };

        let booked = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(num_tickets), 0)::BIGINT
             FROM tickets
             WHERE movie_key = $1 AND theatre_key = $2"
        )
        .bind(key.movie())
        .bind(key.theatre())
        .fetch_one(&mut *tx)
        .await?;

        let admission = Admission::check(total, booked, booking.seat_count);
        if admission != Admission::Admitted {
            debug!("admit_booking {}: rejected, {} of {} booked", key, booked, total);
            return Ok(admission);
        }

        sqlx::query(
            "INSERT INTO tickets
                (id, movie_name, theatre_name, movie_key, theatre_key,
                 num_tickets, seat_numbers, user_login_id, booked_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        )
        .bind(booking.id)
        .bind(&booking.movie_name)
        .bind(&booking.theatre_name)
        .bind(key.movie())
        .bind(key.theatre())
        .bind(booking.seat_count)
        .bind(&booking.seat_labels)
        .bind(&booking.booked_by)
        .bind(booking.booked_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Admission::Admitted)
    }
}
