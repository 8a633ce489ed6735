use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::debug;

use super::NotificationPort;
use crate::error::NotifyError;
use crate::models::InventoryEvent;

/// Publishes events as JSON on the Redis channel named by
/// [`InventoryEvent::topic`].
#[derive(Clone)]
pub struct RedisNotifier {
    conn: MultiplexedConnection,
}

impl RedisNotifier {
    pub async fn connect(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl NotificationPort for RedisNotifier {
    async fn publish(&self, event: InventoryEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(&event)?;
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(event.topic(), payload).await?;
        debug!("Published to {} ({} subscribers)", event.topic(), receivers);
        Ok(())
    }
}
