//! Publication records owned by an instance.

use super::record::{EntityId, EntityKind, Record};
use serde::{Deserialize, Serialize};

/// Persisted publication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: EntityId,
    /// Owning instance; deleting it deletes this publication.
    pub instance_id: EntityId,
    pub priority: i64,
}

/// Create input for a publication. `priority` defaults to 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPublication {
    pub instance_id: EntityId,
    #[serde(default)]
    pub priority: i64,
}

impl NewPublication {
    pub fn new(instance_id: EntityId) -> Self {
        Self {
            instance_id,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PublicationPatch {
    /// Moves the publication to another instance.
    pub instance_id: Option<EntityId>,
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicationFilter {
    All,
    Instance(EntityId),
}

impl Record for Publication {
    const KIND: EntityKind = EntityKind::Publication;

    type Draft = NewPublication;
    type Patch = PublicationPatch;
    type Filter = PublicationFilter;

    fn id(&self) -> EntityId {
        self.id
    }
}
