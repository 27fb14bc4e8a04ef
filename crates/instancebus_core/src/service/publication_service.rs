//! Publication lifecycle service.
//!
//! Publications belong to exactly one instance. The owning instance is
//! resolved through `InstanceService` before creates, re-parenting updates
//! and scoped listings; its `NotFound` is returned unchanged.

use super::lifecycle::Lifecycle;
use super::{DeletePolicy, InstanceService};
use crate::error::ServiceResult;
use crate::events::{publication_created, publication_deleted, publication_updated};
use crate::model::{EntityId, NewPublication, Publication, PublicationFilter, PublicationPatch};
use crate::notify::SharedNotifier;
use crate::repo::Repository;
use std::sync::Arc;

pub struct PublicationService {
    lifecycle: Lifecycle<Publication>,
    instances: Arc<InstanceService>,
}

impl PublicationService {
    pub fn new(
        repo: Arc<dyn Repository<Publication>>,
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

    pub async fn retrieve_one(&self, id: EntityId) -> ServiceResult<Publication> {
        self.lifecycle.retrieve_one(id).await
    }

    /// Lists an instance's publications, highest priority first.
    pub async fn retrieve_by_instance(
        &self,
        instance_id: EntityId,
    ) -> ServiceResult<Vec<Publication>> {
        self.instances.retrieve_one(instance_id).await?;
        self.lifecycle
            .retrieve_many(PublicationFilter::Instance(instance_id))
            .await
    }

    pub async fn create(&self, params: NewPublication) -> ServiceResult<Publication> {
        self.instances.retrieve_one(params.instance_id).await?;
        self.lifecycle.create(params, publication_created).await
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: PublicationPatch,
    ) -> ServiceResult<Publication> {
        if let Some(instance_id) = patch.instance_id {
            self.instances.retrieve_one(instance_id).await?;
        }
        self.lifecycle.update(id, patch, publication_updated).await
    }

    /// Deletes the publication and its tasks, then publishes
    /// `publication.deleted`.
    pub async fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.lifecycle.delete(id, publication_deleted).await
    }
}
