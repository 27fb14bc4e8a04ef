//! In-process event bus on top of `tokio::sync::broadcast`.
//!
//! Subscribers that lag behind lose the oldest events; a send with no
//! subscribers is not an error.

use super::{Notifier, NotifyResult};
use crate::events::DomainEvent;
use async_trait::async_trait;
use log::debug;
use tokio::sync::broadcast;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastNotifier {
    /// `capacity` is the per-subscriber buffer; zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(&self, event: &DomainEvent) -> NotifyResult<()> {
        match self.tx.send(event.clone()) {
            Ok(receivers) => debug!(
                "event=notify_broadcast module=notify status=ok kind={} receivers={}",
                event.kind(),
                receivers
            ),
            Err(_) => debug!(
                "event=notify_broadcast module=notify status=skipped kind={} receivers=0",
                event.kind()
            ),
        }
        Ok(())
    }
}
