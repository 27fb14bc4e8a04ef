//! Instance lifecycle service.
//!
//! # Responsibility
//! - Provide retrieve/create/update/delete entry points for instances.
//! - Announce each completed change through the injected notifier.
//!
//! # Invariants
//! - `create` publishes `instance.created` only after the insert resolved.
//! - `update` re-reads the record and publishes that state.
//! - `delete` cascades in the store; under `DeletePolicy::AlwaysEmit` it
//!   returns `true` and publishes even for unknown ids.

use super::lifecycle::Lifecycle;
use super::DeletePolicy;
use crate::error::ServiceResult;
use crate::events::{instance_created, instance_deleted, instance_updated};
use crate::model::{EntityId, Instance, InstanceFilter, InstancePatch, NewInstance};
use crate::notify::SharedNotifier;
use crate::repo::Repository;
use std::sync::Arc;

pub struct InstanceService {
    lifecycle: Lifecycle<Instance>,
}

impl InstanceService {
    pub fn new(repo: Arc<dyn Repository<Instance>>, notifier: SharedNotifier) -> Self {
        Self {
            lifecycle: Lifecycle::new(repo, notifier),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.lifecycle.set_delete_policy(policy);
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.lifecycle.delete_policy()
    }

    /// Loads one instance; `NotFound` when the id does not resolve.
    pub async fn retrieve_one(&self, id: EntityId) -> ServiceResult<Instance> {
        self.lifecycle.retrieve_one(id).await
    }

    /// Lists a project's instances in id order. No match yields an empty list.
    pub async fn retrieve_by_project(&self, project_id: &str) -> ServiceResult<Vec<Instance>> {
        self.lifecycle
            .retrieve_many(InstanceFilter::Project(project_id.to_string()))
            .await
    }

    /// Persists a new instance, then publishes `instance.created`.
    pub async fn create(&self, params: NewInstance) -> ServiceResult<Instance> {
        self.lifecycle.create(params, instance_created).await
    }

    /// Applies `patch`, re-reads the row and publishes `instance.updated`.
    pub async fn update(&self, id: EntityId, patch: InstancePatch) -> ServiceResult<Instance> {
        self.lifecycle.update(id, patch, instance_updated).await
    }

    /// Deletes the instance with everything it owns, then publishes
    /// `instance.deleted`.
    pub async fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.lifecycle.delete(id, instance_deleted).await
    }
}
