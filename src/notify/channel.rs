use async_trait::async_trait;
use tokio::sync::mpsc;

use super::NotificationPort;
use crate::error::NotifyError;
use crate::models::InventoryEvent;

/// Sending half of the in-process event queue.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<InventoryEvent>,
}

/// Creates a bounded event queue. A full queue makes `publish` wait, which
/// the core caps with its notify timeout.
pub fn channel(capacity: usize) -> (ChannelNotifier, mpsc::Receiver<InventoryEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelNotifier { tx }, rx)
}

#[async_trait]
impl NotificationPort for ChannelNotifier {
    async fn publish(&self, event: InventoryEvent) -> Result<(), NotifyError> {
        self.tx.send(event).await.map_err(|_| NotifyError::ChannelClosed)
    }
}
