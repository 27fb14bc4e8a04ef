//! Entity model for instances and their dependent records.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repository layer.
//! - Define explicit create/update input types per record.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `EntityId`.
//! - Instance is the aggregate root for Publication, User and (through
//!   Publication) Task; cascade deletion is a persistence-layer contract.

pub mod instance;
pub mod publication;
pub mod record;
pub mod task;
pub mod user;

pub use instance::{Instance, InstanceFilter, InstancePatch, NewInstance};
pub use publication::{NewPublication, Publication, PublicationFilter, PublicationPatch};
pub use record::{EntityId, EntityKind, Pending, Record};
pub use task::{NewTask, Task, TaskFilter, TaskPatch};
pub use user::{NewUser, User, UserFilter, UserPatch};
