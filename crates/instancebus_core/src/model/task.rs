//! Task records owned by a publication.

use super::record::{EntityId, EntityKind, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    /// Owning publication; deleting it deletes this task.
    pub publication_id: EntityId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub publication_id: EntityId,
    #[serde(default)]
    pub title: String,
}

impl NewTask {
    pub fn new(publication_id: EntityId, title: impl Into<String>) -> Self {
        Self {
            publication_id,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub publication_id: Option<EntityId>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Publication(EntityId),
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;

    type Draft = NewTask;
    type Patch = TaskPatch;
    type Filter = TaskFilter;

    fn id(&self) -> EntityId {
        self.id
    }
}
