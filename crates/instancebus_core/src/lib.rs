//! Event-driven lifecycle core for instances and their dependent records.
//! Services persist first, then announce each change as a domain event.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod notify;
pub mod registry;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, EventSink};
pub use db::Database;
pub use error::{Dependency, ServiceError, ServiceResult};
pub use events::{DomainEvent, EventAction, EventKind, EventPayload};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::{
    EntityId, EntityKind, Instance, InstancePatch, NewInstance, NewPublication, NewTask, NewUser,
    Publication, PublicationPatch, Task, TaskPatch, User, UserPatch,
};
pub use notify::{
    BroadcastNotifier, LogNotifier, NoopNotifier, Notifier, NotifyError, RecordingNotifier,
    SharedNotifier,
};
pub use registry::ServiceRegistry;
pub use repo::{RepoError, RepoResult, Repository};
pub use service::{DeletePolicy, InstanceService, PublicationService, TaskService, UserService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
