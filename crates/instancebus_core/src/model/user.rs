//! Users attached to an instance.
//!
//! # Invariants
//! - The referenced instance must resolve before a user is created or moved.

use super::record::{deserialize_clearable, EntityId, EntityKind, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub instance_id: EntityId,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub instance_id: EntityId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    pub fn new(instance_id: EntityId, username: impl Into<String>) -> Self {
        Self {
            instance_id,
            username: username.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Partial update for a user; `email: Some(None)` clears the address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub instance_id: Option<EntityId>,
    pub username: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_clearable"
    )]
    pub email: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Instance(EntityId),
}

impl Record for User {
    const KIND: EntityKind = EntityKind::User;

    type Draft = NewUser;
    type Patch = UserPatch;
    type Filter = UserFilter;

    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::UserPatch;

    #[test]
    fn cleared_email_survives_json() {
        let patch = UserPatch {
            email: Some(None),
            ..UserPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        let decoded: UserPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, patch);
    }

    #[test]
    fn absent_email_keeps_stored_value() {
        let patch: UserPatch = serde_json::from_str(r#"{"username":"ada"}"#).unwrap();
        assert_eq!(patch.email, None);
        assert_eq!(patch.username.as_deref(), Some("ada"));

        let json = serde_json::to_string(&patch).unwrap();
        assert!(!json.contains("email"));
    }
}
