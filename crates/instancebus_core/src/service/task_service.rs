//! Task lifecycle service, layered on `PublicationService`.

use super::lifecycle::Lifecycle;
use super::{DeletePolicy, PublicationService};
use crate::error::ServiceResult;
use crate::events::{task_created, task_deleted, task_updated};
use crate::model::{EntityId, NewTask, Task, TaskFilter, TaskPatch};
use crate::notify::SharedNotifier;
use crate::repo::Repository;
use std::sync::Arc;

pub struct TaskService {
    lifecycle: Lifecycle<Task>,
    publications: Arc<PublicationService>,
}

impl TaskService {
    pub fn new(
        repo: Arc<dyn Repository<Task>>,
        notifier: SharedNotifier,
        publications: Arc<PublicationService>,
    ) -> Self {
        Self {
            lifecycle: Lifecycle::new(repo, notifier),
            publications,
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.lifecycle.set_delete_policy(policy);
        self
    }

    pub fn publications(&self) -> &Arc<PublicationService> {
        &self.publications
    }

    pub async fn retrieve_one(&self, id: EntityId) -> ServiceResult<Task> {
        self.lifecycle.retrieve_one(id).await
    }

    pub async fn retrieve_by_publication(
        &self,
        publication_id: EntityId,
    ) -> ServiceResult<Vec<Task>> {
        self.publications.retrieve_one(publication_id).await?;
        self.lifecycle
            .retrieve_many(TaskFilter::Publication(publication_id))
            .await
    }

    pub async fn create(&self, params: NewTask) -> ServiceResult<Task> {
        self.publications.retrieve_one(params.publication_id).await?;
        self.lifecycle.create(params, task_created).await
    }

    pub async fn update(&self, id: EntityId, patch: TaskPatch) -> ServiceResult<Task> {
        if let Some(publication_id) = patch.publication_id {
            self.publications.retrieve_one(publication_id).await?;
        }
        self.lifecycle.update(id, patch, task_updated).await
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.lifecycle.delete(id, task_deleted).await
    }
}
