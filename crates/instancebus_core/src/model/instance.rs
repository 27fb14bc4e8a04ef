//! Instance aggregate root.
//!
//! # Invariants
//! - `id` is assigned by the store and never taken from caller input.
//! - `project_id` groups instances for listing and must be non-empty
//!   (enforced by the store schema, not here).

use super::record::{deserialize_clearable, EntityId, EntityKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted instance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: EntityId,
    pub project_id: String,
    pub name: Option<String>,
    /// Free-form attributes supplied at creation, stored as one JSON column.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Create input for an instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewInstance {
    pub project_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl NewInstance {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Partial update for an instance; `None` keeps the stored value.
///
/// `name: Some(None)` clears the name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstancePatch {
    pub project_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_clearable"
    )]
    pub name: Option<Option<String>>,
    pub metadata: Option<BTreeMap<String, String>>,
}

impl InstancePatch {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none() && self.name.is_none() && self.metadata.is_none()
    }
}

/// Listing scope for instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceFilter {
    All,
    Project(String),
}

impl Record for Instance {
    const KIND: EntityKind = EntityKind::Instance;

    type Draft = NewInstance;
    type Patch = InstancePatch;
    type Filter = InstanceFilter;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::InstancePatch;

    #[test]
    fn patch_keeps_clear_and_keep_apart_in_json() {
        let clear = InstancePatch {
            name: Some(None),
            ..InstancePatch::default()
        };
        let json = serde_json::to_string(&clear).unwrap();
        assert_eq!(json, r#"{"project_id":null,"name":null,"metadata":null}"#);
        assert_eq!(serde_json::from_str::<InstancePatch>(&json).unwrap(), clear);

        let keep: InstancePatch = serde_json::from_str("{}").unwrap();
        assert_eq!(keep.name, None);
        assert!(keep.is_empty());

        let rename: InstancePatch = serde_json::from_str(r#"{"name":"edge"}"#).unwrap();
        assert_eq!(rename.name, Some(Some("edge".to_string())));
    }
}
