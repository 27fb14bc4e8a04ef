//! Composition root for lifecycle services.
//!
//! # Responsibility
//! - Construct each service at most once per registry and hand out shared
//!   handles afterwards.
//! - Resolve construction order: publication/user services build the
//!   instance service first, the task service builds the publication service.
//!
//! # Invariants
//! - Each slot is either uninitialized or holds the one cached service.
//! - The first call's database and notifier win; later arguments are
//!   ignored, even when they differ.
//! - First construction is guarded, so concurrent first calls build one
//!   service.

use crate::db::Database;
use crate::model::EntityKind;
use crate::notify::SharedNotifier;
use crate::repo::{
    SqliteInstanceRepository, SqlitePublicationRepository, SqliteTaskRepository,
    SqliteUserRepository,
};
use crate::service::{
    DeletePolicy, InstanceService, PublicationService, TaskService, UserService,
};
use log::info;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Process-lifetime owner of the lifecycle services.
#[derive(Default)]
pub struct ServiceRegistry {
    delete_policy: DeletePolicy,
    instance: OnceCell<Arc<InstanceService>>,
    publication: OnceCell<Arc<PublicationService>>,
    user: OnceCell<Arc<UserService>>,
    task: OnceCell<Arc<TaskService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delete policy applied to every service this registry builds.
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Returns whether the service for `kind` has been constructed.
    pub fn is_initialized(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Instance => self.instance.get().is_some(),
            EntityKind::Publication => self.publication.get().is_some(),
            EntityKind::Task => self.task.get().is_some(),
            EntityKind::User => self.user.get().is_some(),
        }
    }

    pub fn instance_service(
        &self,
        db: &Database,
        notifier: SharedNotifier,
    ) -> Arc<InstanceService> {
        let service = self.instance.get_or_init(|| {
            log_init(EntityKind::Instance);
            let repo = Arc::new(SqliteInstanceRepository::new(db.clone()));
            Arc::new(InstanceService::new(repo, notifier).with_delete_policy(self.delete_policy))
        });
        Arc::clone(service)
    }

    pub fn publication_service(
        &self,
        db: &Database,
        notifier: SharedNotifier,
    ) -> Arc<PublicationService> {
        let service = self.publication.get_or_init(|| {
            let instances = self.instance_service(db, Arc::clone(&notifier));
            log_init(EntityKind::Publication);
            let repo = Arc::new(SqlitePublicationRepository::new(db.clone()));
            Arc::new(
                PublicationService::new(repo, notifier, instances)
                    .with_delete_policy(self.delete_policy),
            )
        });
        Arc::clone(service)
    }

    pub fn user_service(&self, db: &Database, notifier: SharedNotifier) -> Arc<UserService> {
        let service = self.user.get_or_init(|| {
            let instances = self.instance_service(db, Arc::clone(&notifier));
            log_init(EntityKind::User);
            let repo = Arc::new(SqliteUserRepository::new(db.clone()));
            Arc::new(
                UserService::new(repo, notifier, instances).with_delete_policy(self.delete_policy),
            )
        });
        Arc::clone(service)
    }

    pub fn task_service(&self, db: &Database, notifier: SharedNotifier) -> Arc<TaskService> {
        let service = self.task.get_or_init(|| {
            let publications = self.publication_service(db, Arc::clone(&notifier));
            log_init(EntityKind::Task);
            let repo = Arc::new(SqliteTaskRepository::new(db.clone()));
            Arc::new(
                TaskService::new(repo, notifier, publications)
                    .with_delete_policy(self.delete_policy),
            )
        });
        Arc::clone(service)
    }
}

fn log_init(kind: EntityKind) {
    info!("event=service_init module=registry status=ok service={kind}");
}

#[cfg(test)]
mod tests {
    use super::ServiceRegistry;
    use crate::db::Database;
    use crate::model::EntityKind;
    use crate::notify::{NoopNotifier, SharedNotifier};
    use crate::service::DeletePolicy;
    use std::sync::Arc;

    fn noop() -> SharedNotifier {
        Arc::new(NoopNotifier)
    }

    #[test]
    fn slots_start_uninitialized() {
        let registry = ServiceRegistry::new();
        for kind in [
            EntityKind::Instance,
            EntityKind::Publication,
            EntityKind::Task,
            EntityKind::User,
        ] {
            assert!(!registry.is_initialized(kind));
        }
    }

    #[test]
    fn task_service_builds_its_whole_dependency_chain() {
        let registry = ServiceRegistry::new();
        let db = Database::open_in_memory().unwrap();

        let tasks = registry.task_service(&db, noop());

        assert!(registry.is_initialized(EntityKind::Task));
        assert!(registry.is_initialized(EntityKind::Publication));
        assert!(registry.is_initialized(EntityKind::Instance));
        assert!(!registry.is_initialized(EntityKind::User));
        assert!(Arc::ptr_eq(
            tasks.publications(),
            &registry.publication_service(&db, noop())
        ));
    }

    #[test]
    fn delete_policy_reaches_built_services() {
        let registry = ServiceRegistry::new().with_delete_policy(DeletePolicy::RequireExisting);
        let db = Database::open_in_memory().unwrap();
        let instances = registry.instance_service(&db, noop());
        assert_eq!(instances.delete_policy(), DeletePolicy::RequireExisting);
    }
}
