#![allow(dead_code)]

use fake::{faker::internet::en::Username, Fake};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use movie_booking::config::BookingConfig;
use movie_booking::models::{BookingRequest, InventoryEvent};
use movie_booking::notify::{self, NotificationPort};
use movie_booking::services::BookingCore;
use movie_booking::store::MemoryInventoryStore;

pub fn test_config() -> BookingConfig {
    BookingConfig {
        store_timeout: Duration::from_secs(2),
        notify_timeout: Duration::from_millis(200),
        channel_capacity: 64,
    }
}

/// Core over `store` with a channel notifier; the receiver is returned so
/// tests can inspect or drop it.
pub fn core_with(
    store: Arc<MemoryInventoryStore>,
) -> (Arc<BookingCore>, mpsc::Receiver<InventoryEvent>) {
    let (notifier, rx) = notify::channel(64);
    let core = Arc::new(BookingCore::new(store, Arc::new(notifier), &test_config()));
    (core, rx)
}

pub fn core_with_notifier(
    store: Arc<MemoryInventoryStore>,
    notifier: Arc<dyn NotificationPort>,
    config: &BookingConfig,
) -> Arc<BookingCore> {
    Arc::new(BookingCore::new(store, notifier, config))
}

pub fn seats(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{}{}", prefix, n)).collect()
}

pub fn request(movie: &str, theatre: &str, labels: Vec<String>) -> BookingRequest {
    BookingRequest {
        movie_name: movie.to_string(),
        theatre_name: theatre.to_string(),
        seat_count: labels.len() as i32,
        seat_labels: labels,
        requester: Username().fake(),
    }
}
