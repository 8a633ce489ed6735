use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::NotificationPort;
use crate::error::BookingError;
use crate::models::InventoryEvent;
use crate::services::BookingCore;

/// Consumes booking events and keeps the stored status in step with the
/// ledger.
///
/// Holds the core weakly: the core owns the sending half of the channel, so
/// once the last strong handle is gone the channel closes and the listener
/// stops.
pub struct StatusListener {
    core: Weak<BookingCore>,
    status_port: Option<Arc<dyn NotificationPort>>,
    publish_timeout: Duration,
}

impl StatusListener {
    pub fn new(core: &Arc<BookingCore>) -> Self {
        Self {
            core: Arc::downgrade(core),
            status_port: None,
            publish_timeout: core.notify_timeout(),
        }
    }

    /// Re-publishes every recomputed status through `port`. Each publish is
    /// capped by the core's notify timeout.
    pub fn with_status_port(mut self, port: Arc<dyn NotificationPort>) -> Self {
        self.status_port = Some(port);
        self
    }

    pub fn spawn(self, rx: mpsc::Receiver<InventoryEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    pub async fn run(self, mut rx: mpsc::Receiver<InventoryEvent>) {
        info!("Status listener started");
        while let Some(event) = rx.recv().await {
            let Some(core) = self.core.upgrade() else {
                break;
            };
            self.handle(&core, event).await;
        }
        info!("Status listener stopped");
    }

    async fn handle(&self, core: &BookingCore, event: InventoryEvent) {
        let (movie_name, theatre_name) = match event {
            InventoryEvent::BookingOccurred {
                movie_name,
                theatre_name,
                seat_count,
            } => {
                debug!("Booking of {} seats for {} at {}", seat_count, movie_name, theatre_name);
                (movie_name, theatre_name)
            }
            InventoryEvent::StatusChanged { .. } => return,
        };

        match core.recompute_status(&movie_name, &theatre_name).await {
            Ok(status) => {
                if let Some(port) = &self.status_port {
                    let update = InventoryEvent::StatusChanged {
                        movie_name,
                        theatre_name,
                        status,
                    };
                    match tokio::time::timeout(self.publish_timeout, port.publish(update)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!("Failed to publish status update: {}", e),
                        Err(_) => warn!(
                            "Publishing status update timed out after {:?}",
                            self.publish_timeout
                        ),
                    }
                }
            }
            // deleted between booking and recompute
            Err(e @ BookingError::NotFound { .. }) => warn!("Skipping status recompute: {}", e),
            Err(e) => error!(
                "Status recompute failed for {} at {}: {}",
                movie_name, theatre_name, e
            ),
        }
    }
}
