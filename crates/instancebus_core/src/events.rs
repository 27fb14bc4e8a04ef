//! Domain event values and their pure constructors.
//!
//! # Responsibility
//! - Describe completed state changes for subscribers outside the store.
//! - Build events from record snapshots without side effects.
//!
//! # Invariants
//! - Constructors never fail and never mutate their input.
//! - Identical input yields value-equal events (no timestamps or random ids).

use crate::model::{EntityId, EntityKind, Instance, Publication, Task, User};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl EventAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// Entity type × action, rendered as `instance.created` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind {
    pub entity: EntityKind,
    pub action: EventAction,
}

impl EventKind {
    pub const fn new(entity: EntityKind, action: EventAction) -> Self {
        Self { entity, action }
    }

    /// Routing key form, e.g. `publication.deleted`.
    pub fn as_str(&self) -> &'static str {
        match (self.entity, self.action) {
            (EntityKind::Instance, EventAction::Created) => "instance.created",
            (EntityKind::Instance, EventAction::Updated) => "instance.updated",
            (EntityKind::Instance, EventAction::Deleted) => "instance.deleted",
            (EntityKind::Publication, EventAction::Created) => "publication.created",
            (EntityKind::Publication, EventAction::Updated) => "publication.updated",
            (EntityKind::Publication, EventAction::Deleted) => "publication.deleted",
            (EntityKind::Task, EventAction::Created) => "task.created",
            (EntityKind::Task, EventAction::Updated) => "task.updated",
            (EntityKind::Task, EventAction::Deleted) => "task.deleted",
            (EntityKind::User, EventAction::Created) => "user.created",
            (EntityKind::User, EventAction::Updated) => "user.updated",
            (EntityKind::User, EventAction::Deleted) => "user.deleted",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let (entity, action) = value.split_once('.')?;
        let entity = match entity {
            "instance" => EntityKind::Instance,
            "publication" => EntityKind::Publication,
            "task" => EntityKind::Task,
            "user" => EntityKind::User,
            _ => return None,
        };
        let action = match action {
            "created" => EventAction::Created,
            "updated" => EventAction::Updated,
            "deleted" => EventAction::Deleted,
            _ => return None,
        };
        Some(Self::new(entity, action))
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown event kind `{value}`")))
    }
}

/// Snapshot carried by an event.
///
/// Created/updated events carry the persisted record; deleted events only
/// carry the id that was requested for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Instance(Instance),
    Publication(Publication),
    Task(Task),
    User(User),
    Deleted { id: EntityId },
}

/// Immutable description of one completed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    kind: EventKind,
    payload: EventPayload,
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Id of the record the event is about.
    pub fn entity_id(&self) -> EntityId {
        match &self.payload {
            EventPayload::Instance(instance) => instance.id,
            EventPayload::Publication(publication) => publication.id,
            EventPayload::Task(task) => task.id,
            EventPayload::User(user) => user.id,
            EventPayload::Deleted { id } => *id,
        }
    }

    /// Serializes the event for broker transports.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn new(entity: EntityKind, action: EventAction, payload: EventPayload) -> Self {
        Self {
            kind: EventKind::new(entity, action),
            payload,
        }
    }
}

pub fn instance_created(instance: &Instance) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Instance,
        EventAction::Created,
        EventPayload::Instance(instance.clone()),
    )
}

pub fn instance_updated(instance: &Instance) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Instance,
        EventAction::Updated,
        EventPayload::Instance(instance.clone()),
    )
}

pub fn instance_deleted(id: EntityId) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Instance,
        EventAction::Deleted,
        EventPayload::Deleted { id },
    )
}

pub fn publication_created(publication: &Publication) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Publication,
        EventAction::Created,
        EventPayload::Publication(publication.clone()),
    )
}

pub fn publication_updated(publication: &Publication) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Publication,
        EventAction::Updated,
        EventPayload::Publication(publication.clone()),
    )
}

pub fn publication_deleted(id: EntityId) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Publication,
        EventAction::Deleted,
        EventPayload::Deleted { id },
    )
}

pub fn task_created(task: &Task) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Task,
        EventAction::Created,
        EventPayload::Task(task.clone()),
    )
}

pub fn task_updated(task: &Task) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Task,
        EventAction::Updated,
        EventPayload::Task(task.clone()),
    )
}

pub fn task_deleted(id: EntityId) -> DomainEvent {
    DomainEvent::new(
        EntityKind::Task,
        EventAction::Deleted,
        EventPayload::Deleted { id },
    )
}

pub fn user_created(user: &User) -> DomainEvent {
    DomainEvent::new(
        EntityKind::User,
        EventAction::Created,
        EventPayload::User(user.clone()),
    )
}

pub fn user_updated(user: &User) -> DomainEvent {
    DomainEvent::new(
        EntityKind::User,
        EventAction::Updated,
        EventPayload::User(user.clone()),
    )
}

pub fn user_deleted(id: EntityId) -> DomainEvent {
    DomainEvent::new(
        EntityKind::User,
        EventAction::Deleted,
        EventPayload::Deleted { id },
    )
}
