//! Shared record identity and kind metadata.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned primary key shared by every record type.
pub type EntityId = i64;

/// Record category, used by events, errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Instance,
    Publication,
    Task,
    User,
}

impl EntityKind {
    /// Returns the lowercase label used in event kinds (`instance`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Publication => "publication",
            Self::Task => "task",
            Self::User => "user",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record type together with its input shapes.
///
/// `Draft` is the create input, `Patch` the partial update input and
/// `Filter` the listing scope accepted by `Repository::find`.
pub trait Record: std::fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    const KIND: EntityKind;

    type Draft: std::fmt::Debug + Clone + PartialEq + Send + Sync + 'static;
    type Patch: Clone + Send + Sync + 'static;
    type Filter: Clone + Send + Sync + 'static;

    fn id(&self) -> EntityId;
}

/// An unsaved record built from its draft; it has no id until saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Pending<R: Record> {
    pub draft: R::Draft,
}

impl<R: Record> Pending<R> {
    pub fn new(draft: R::Draft) -> Self {
        Self { draft }
    }

    pub fn into_draft(self) -> R::Draft {
        self.draft
    }
}

/// Deserializes a clearable patch field: absent stays `None` (via
/// `#[serde(default)]`), `null` becomes `Some(None)`, a value `Some(Some(_))`.
pub(crate) fn deserialize_clearable<'de, T, D>(
    deserializer: D,
) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
