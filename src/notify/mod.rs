//! Outbound inventory events.
//!
//! The booking core only knows [`NotificationPort`]. In a running service the
//! port is a [`ChannelNotifier`] feeding the [`StatusListener`], optionally
//! fanned out to Redis pub/sub for other consumers.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::error::NotifyError;
use crate::models::InventoryEvent;

pub mod channel;
pub mod listener;
pub mod redis;

pub use self::channel::{channel, ChannelNotifier};
pub use self::listener::StatusListener;
pub use self::redis::RedisNotifier;

#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, event: InventoryEvent) -> Result<(), NotifyError>;
}

/// Publishes every event to each target in order.
///
/// A failing target does not stop delivery to the rest; the first error is
/// returned once all targets were tried.
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn NotificationPort>>,
}

impl FanoutNotifier {
    pub fn new(targets: Vec<Arc<dyn NotificationPort>>) -> Self {
        Self { targets }
    }
}

#[async_trait]
impl NotificationPort for FanoutNotifier {
    async fn publish(&self, event: InventoryEvent) -> Result<(), NotifyError> {
        let mut first_error = None;
        for target in &self.targets {
            if let Err(e) = target.publish(event.clone()).await {
                warn!("Fan-out target failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
