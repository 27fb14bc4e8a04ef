//! Notifier that writes each event to the core log as JSON.

use super::{Notifier, NotifyError, NotifyResult};
use crate::events::DomainEvent;
use async_trait::async_trait;
use log::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, event: &DomainEvent) -> NotifyResult<()> {
        let body = event
            .to_json()
            .map_err(|err| NotifyError::Unavailable(format!("event encoding failed: {err}")))?;
        info!(
            "event=domain_event module=notify kind={} id={} body={}",
            event.kind(),
            event.entity_id(),
            body
        );
        Ok(())
    }
}
