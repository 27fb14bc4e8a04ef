//! Lifecycle services: persistence followed by event emission.
//!
//! # Responsibility
//! - Orchestrate repository writes and notifications per record type.
//! - Resolve parent records through the parent service before dependent
//!   writes.
//!
//! # Invariants
//! - Every successful mutation publishes exactly one event, after the write
//!   has resolved.
//! - A failed write publishes nothing.
//! - Update events carry the re-read record, never the caller's patch.

mod instance_service;
mod lifecycle;
mod publication_service;
mod task_service;
mod user_service;

pub use instance_service::InstanceService;
pub use publication_service::PublicationService;
pub use task_service::TaskService;
pub use user_service::UserService;

use serde::{Deserialize, Serialize};

/// How `delete` treats ids that do not resolve to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Delete without an existence check and always publish the event.
    /// Subscribers must tolerate deletes for ids that never existed.
    #[default]
    AlwaysEmit,
    /// Fail with `NotFound` (and publish nothing) for unknown ids.
    RequireExisting,
}
