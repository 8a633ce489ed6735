pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use notify::{FanoutNotifier, NotificationPort, RedisNotifier, StatusListener};
use services::BookingCore;
use store::{InventoryStore, MemoryInventoryStore, PgInventoryStore};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<BookingCore>,
    pub config: config::Config,
}

impl AppState {
    /// Wires the store, the notification channel and the status listener
    /// from `config`, and starts the listener task.
    pub async fn build(config: config::Config) -> Result<Arc<Self>, error::StartupError> {
        let store: Arc<dyn InventoryStore> = match &config.database {
            Some(db_config) => {
                let db = database::Database::connect(db_config).await?;
                db.run_migrations().await?;
                info!("Using PostgreSQL inventory store");
                Arc::new(PgInventoryStore::new(db))
            }
            None => {
                warn!("DATABASE_URL not set, using in-memory inventory store");
                Arc::new(MemoryInventoryStore::new())
            }
        };

        let redis = match &config.redis {
            Some(redis_config) => {
                let notifier = RedisNotifier::connect(&redis_config.url).await?;
                info!("Redis connected, mirroring inventory events");
                Some(Arc::new(notifier) as Arc<dyn NotificationPort>)
            }
            None => None,
        };

        let (channel, rx) = notify::channel(config.booking.channel_capacity);
        let channel: Arc<dyn NotificationPort> = Arc::new(channel);
        let notifier: Arc<dyn NotificationPort> = match &redis {
            Some(redis) => Arc::new(FanoutNotifier::new(vec![channel, redis.clone()])),
            None => channel,
        };

        let core = Arc::new(BookingCore::new(store, notifier, &config.booking));

        let mut listener = StatusListener::new(&core);
        if let Some(redis) = redis {
            listener = listener.with_status_port(redis);
        }
        listener.spawn(rx);

        Ok(Arc::new(Self { core, config }))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Movie Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1.0/moviebooking", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
