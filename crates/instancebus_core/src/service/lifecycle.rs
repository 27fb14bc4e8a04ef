//! Write-then-notify protocol shared by all lifecycle services.

use super::DeletePolicy;
use crate::error::{ServiceError, ServiceResult};
use crate::events::DomainEvent;
use crate::model::{EntityId, Record};
use crate::notify::SharedNotifier;
use crate::repo::Repository;
use log::{error, info, warn};
use std::sync::Arc;

pub(crate) struct Lifecycle<R: Record> {
    repo: Arc<dyn Repository<R>>,
    notifier: SharedNotifier,
    delete_policy: DeletePolicy,
}

impl<R: Record> Lifecycle<R> {
    pub(crate) fn new(repo: Arc<dyn Repository<R>>, notifier: SharedNotifier) -> Self {
        Self {
            repo,
            notifier,
            delete_policy: DeletePolicy::default(),
        }
    }

    pub(crate) fn set_delete_policy(&mut self, policy: DeletePolicy) {
        self.delete_policy = policy;
    }

    pub(crate) fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub(crate) async fn retrieve_one(&self, id: EntityId) -> ServiceResult<R> {
        self.repo
            .find_one(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::KIND, id))
    }

    pub(crate) async fn retrieve_many(&self, filter: R::Filter) -> ServiceResult<Vec<R>> {
        Ok(self.repo.find(filter).await?)
    }

    pub(crate) async fn create(
        &self,
        draft: R::Draft,
        event: fn(&R) -> DomainEvent,
    ) -> ServiceResult<R> {
        let pending = self.repo.create(draft);
        let record = self
            .repo
            .save(pending)
            .await
            .map_err(|err| log_failure::<R>("create", None, err.into()))?;

        self.publish(event(&record)).await?;
        info!(
            "event={}_create module=service status=ok id={}",
            R::KIND,
            record.id()
        );
        Ok(record)
    }

    pub(crate) async fn update(
        &self,
        id: EntityId,
        patch: R::Patch,
        event: fn(&R) -> DomainEvent,
    ) -> ServiceResult<R> {
        self.repo
            .update(id, patch)
            .await
            .map_err(|err| log_failure::<R>("update", Some(id), err.into()))?;
        let record = self
            .retrieve_one(id)
            .await
            .map_err(|err| log_failure::<R>("update", Some(id), err))?;

        self.publish(event(&record)).await?;
        info!("event={}_update module=service status=ok id={}", R::KIND, id);
        Ok(record)
    }

    pub(crate) async fn delete(
        &self,
        id: EntityId,
        event: fn(EntityId) -> DomainEvent,
    ) -> ServiceResult<bool> {
        if self.delete_policy == DeletePolicy::RequireExisting {
            self.retrieve_one(id)
                .await
                .map_err(|err| log_failure::<R>("delete", Some(id), err))?;
        }
        self.repo
            .delete(id)
            .await
            .map_err(|err| log_failure::<R>("delete", Some(id), err.into()))?;

        self.publish(event(id)).await?;
        info!("event={}_delete module=service status=ok id={}", R::KIND, id);
        Ok(true)
    }

    async fn publish(&self, event: DomainEvent) -> ServiceResult<()> {
        if let Err(err) = self.notifier.publish(&event).await {
            error!(
                "event=notify module=service status=error kind={} id={} error={}",
                event.kind(),
                event.entity_id(),
                err
            );
            return Err(err.into());
        }
        Ok(())
    }
}

fn log_failure<R: Record>(op: &str, id: Option<EntityId>, err: ServiceError) -> ServiceError {
    match id {
        Some(id) => warn!(
            "event={}_{op} module=service status=error id={id} error_code={} error={}",
            R::KIND,
            err.code(),
            err
        ),
        None => warn!(
            "event={}_{op} module=service status=error error_code={} error={}",
            R::KIND,
            err.code(),
            err
        ),
    }
    err
}
