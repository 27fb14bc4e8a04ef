//! Notification gateway: where domain events leave the core.
//!
//! # Responsibility
//! - Define the narrow `Notifier` capability services publish through.
//! - Provide in-process adapters (no-op, recorder, broadcast bus, log sink).
//!
//! # Invariants
//! - `publish` is awaited by the caller but its result carries no value.
//! - Adapters never retry; delivery is best-effort.

use crate::events::DomainEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

mod broadcast;
mod log_sink;
mod recording;

pub use broadcast::{BroadcastNotifier, DEFAULT_CHANNEL_CAPACITY};
pub use log_sink::LogNotifier;
pub use recording::RecordingNotifier;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// The broker (or in-process bus) could not accept the event.
    #[error("notifier unavailable: {0}")]
    Unavailable(String),
}

/// Sink for domain events emitted after successful writes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> NotifyResult<()>;
}

/// Shared notifier handle as held by services.
pub type SharedNotifier = Arc<dyn Notifier>;

/// Drops every event. Default sink when no broker is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn publish(&self, _event: &DomainEvent) -> NotifyResult<()> {
        Ok(())
    }
}
