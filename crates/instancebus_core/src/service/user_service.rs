//! User lifecycle service.
//!
//! Users are scoped to an instance; the instance must resolve through
//! `InstanceService` before a user is created, moved or listed.

use super::lifecycle::Lifecycle;
use super::{DeletePolicy, InstanceService};
use crate::error::ServiceResult;
use crate::events::{user_created, user_deleted, user_updated};
use crate::model::{EntityId, NewUser, User, UserFilter, UserPatch};
use crate::notify::SharedNotifier;
use crate::repo::Repository;
use std::sync::Arc;

pub struct UserService {
    lifecycle: Lifecycle<User>,
    instances: Arc<InstanceService>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn Repository<User>>,
        notifier: SharedNotifier,
        instances: Arc<InstanceService>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(repo, notifier),
            instances,
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.lifecycle.set_delete_policy(policy);
        self
    }

    pub fn instances(&self) -> &Arc<InstanceService> {
        &self.instances
    }

    pub async fn retrieve_one(&self, id: EntityId) -> ServiceResult<User> {
        self.lifecycle.retrieve_one(id).await
    }

    pub async fn retrieve_by_instance(&self, instance_id: EntityId) -> ServiceResult<Vec<User>> {
        self.instances.retrieve_one(instance_id).await?;
        self.lifecycle
            .retrieve_many(UserFilter::Instance(instance_id))
            .await
    }

    pub async fn create(&self, params: NewUser) -> ServiceResult<User> {
        self.instances.retrieve_one(params.instance_id).await?;
        self.lifecycle.create(params, user_created).await
    }

    pub async fn update(&self, id: EntityId, patch: UserPatch) -> ServiceResult<User> {
        if let Some(instance_id) = patch.instance_id {
            self.instances.retrieve_one(instance_id).await?;
        }
        self.lifecycle.update(id, patch, user_updated).await
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.lifecycle.delete(id, user_deleted).await
    }
}
