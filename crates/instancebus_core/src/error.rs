//! Service-level error taxonomy.
//!
//! # Invariants
//! - Services surface every failure to the immediate caller.
//! - A parent lookup failure inside a dependent service is returned as the
//!   exact `NotFound` value the parent service produced.

use crate::model::{EntityId, EntityKind};
use crate::notify::NotifyError;
use crate::repo::RepoError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Which collaborator could not be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Store,
    Notifier,
}

impl Dependency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Notifier => "notifier",
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },
    /// Input rejected by the store; the core performs no validation itself.
    #[error("validation failed: {0}")]
    ValidationFailure(String),
    #[error("{dependency} unavailable: {reason}")]
    DependencyUnavailable {
        dependency: Dependency,
        reason: String,
    },
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Stable code for log lines and transport adapters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::ValidationFailure(_) => "validation_failure",
            Self::DependencyUnavailable { .. } => "dependency_unavailable",
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(message) => Self::ValidationFailure(message),
            RepoError::Unavailable(reason) => Self::DependencyUnavailable {
                dependency: Dependency::Store,
                reason,
            },
            other => Self::DependencyUnavailable {
                dependency: Dependency::Store,
                reason: other.to_string(),
            },
        }
    }
}

impl From<NotifyError> for ServiceError {
    fn from(value: NotifyError) -> Self {
        match value {
            NotifyError::Unavailable(reason) => Self::DependencyUnavailable {
                dependency: Dependency::Notifier,
                reason,
            },
        }
    }
}
