use instancebus_core::events::{instance_deleted, publication_deleted};
use instancebus_core::{
    Database, NewInstance, NewPublication, NewTask, NewUser, RecordingNotifier, ServiceRegistry,
    SharedNotifier,
};
use std::sync::Arc;

fn count(db_path: &std::path::Path, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(db_path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[tokio::test]
async fn deleting_instance_removes_all_dependents_and_emits_one_event() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cascade.db");
    let db = Database::open(&db_path).unwrap();
    let recorder = Arc::new(RecordingNotifier::new());
    let notifier: SharedNotifier = recorder.clone();
    let registry = ServiceRegistry::new();
    let instances = registry.instance_service(&db, notifier.clone());
    let publications = registry.publication_service(&db, notifier.clone());
    let users = registry.user_service(&db, notifier.clone());
    let tasks = registry.task_service(&db, notifier);

    let doomed = instances.create(NewInstance::new("proj-1")).await.unwrap();
    let survivor = instances.create(NewInstance::new("proj-2")).await.unwrap();
    for parent in [doomed.id, survivor.id] {
        let publication = publications
            .create(NewPublication::new(parent))
            .await
            .unwrap();
        tasks
            .create(NewTask::new(publication.id, "ship"))
            .await
            .unwrap();
        users.create(NewUser::new(parent, "ada")).await.unwrap();
    }
    recorder.clear();

    assert!(instances.delete(doomed.id).await.unwrap());

    assert_eq!(recorder.events(), vec![instance_deleted(doomed.id)]);
    assert!(instances.retrieve_one(doomed.id).await.unwrap_err().is_not_found());
    assert!(publications
        .retrieve_by_instance(doomed.id)
        .await
        .unwrap_err()
        .is_not_found());

    assert_eq!(count(&db_path, "instances"), 1);
    assert_eq!(count(&db_path, "publications"), 1);
    assert_eq!(count(&db_path, "tasks"), 1);
    assert_eq!(count(&db_path, "users"), 1);
    assert_eq!(
        publications.retrieve_by_instance(survivor.id).await.unwrap().len(),
        1
    );
    assert_eq!(users.retrieve_by_instance(survivor.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_publication_removes_its_tasks_only() {
    let db = Database::open_in_memory().unwrap();
    let recorder = Arc::new(RecordingNotifier::new());
    let notifier: SharedNotifier = recorder.clone();
    let registry = ServiceRegistry::new();
    let instances = registry.instance_service(&db, notifier.clone());
    let publications = registry.publication_service(&db, notifier.clone());
    let tasks = registry.task_service(&db, notifier);

    let instance = instances.create(NewInstance::new("proj-1")).await.unwrap();
    let doomed = publications
        .create(NewPublication::new(instance.id))
        .await
        .unwrap();
    let kept = publications
        .create(NewPublication::new(instance.id))
        .await
        .unwrap();
    let doomed_task = tasks.create(NewTask::new(doomed.id, "a")).await.unwrap();
    let kept_task = tasks.create(NewTask::new(kept.id, "b")).await.unwrap();
    recorder.clear();

    assert!(publications.delete(doomed.id).await.unwrap());

    assert_eq!(recorder.events(), vec![publication_deleted(doomed.id)]);
    assert!(tasks.retrieve_one(doomed_task.id).await.unwrap_err().is_not_found());
    assert_eq!(tasks.retrieve_one(kept_task.id).await.unwrap(), kept_task);
    assert_eq!(instances.retrieve_one(instance.id).await.unwrap(), instance);
}
