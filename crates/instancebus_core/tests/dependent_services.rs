use instancebus_core::events::{
    publication_created, task_created, task_deleted, user_created, user_updated,
};
use instancebus_core::{
    Database, EntityKind, InstanceService, NewInstance, NewPublication, NewTask, NewUser,
    PublicationPatch, PublicationService, RecordingNotifier, ServiceError, ServiceRegistry,
    SharedNotifier, TaskPatch, TaskService, UserPatch, UserService,
};
use std::sync::Arc;

struct Fixture {
    recorder: Arc<RecordingNotifier>,
    instances: Arc<InstanceService>,
    publications: Arc<PublicationService>,
    users: Arc<UserService>,
    tasks: Arc<TaskService>,
}

fn fixture() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let recorder = Arc::new(RecordingNotifier::new());
    let notifier: SharedNotifier = recorder.clone();
    let registry = ServiceRegistry::new();

    Fixture {
        instances: registry.instance_service(&db, notifier.clone()),
        publications: registry.publication_service(&db, notifier.clone()),
        users: registry.user_service(&db, notifier.clone()),
        tasks: registry.task_service(&db, notifier),
        recorder,
    }
}

#[tokio::test]
async fn publication_create_requires_existing_instance() {
    let fx = fixture();

    let err = fx
        .publications
        .create(NewPublication::new(404))
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::not_found(EntityKind::Instance, 404));
    assert!(fx.recorder.is_empty());
}

#[tokio::test]
async fn parent_not_found_matches_instance_service_error() {
    let fx = fixture();

    let direct = fx.instances.retrieve_one(77).await.unwrap_err();
    let via_users = fx.users.create(NewUser::new(77, "ada")).await.unwrap_err();
    let via_listing = fx.publications.retrieve_by_instance(77).await.unwrap_err();

    assert_eq!(via_users, direct);
    assert_eq!(via_listing, direct);
}

#[tokio::test]
async fn publication_create_publishes_persisted_record() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    fx.recorder.clear();

    let publication = fx
        .publications
        .create(NewPublication::new(instance.id).with_priority(5))
        .await
        .unwrap();

    assert_eq!(publication.instance_id, instance.id);
    assert_eq!(publication.priority, 5);
    assert_eq!(fx.recorder.events(), vec![publication_created(&publication)]);
}

#[tokio::test]
async fn publications_list_by_priority_then_creation_order() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    let other = fx.instances.create(NewInstance::new("proj-2")).await.unwrap();

    let low = fx
        .publications
        .create(NewPublication::new(instance.id).with_priority(1))
        .await
        .unwrap();
    let high = fx
        .publications
        .create(NewPublication::new(instance.id).with_priority(9))
        .await
        .unwrap();
    let low_again = fx
        .publications
        .create(NewPublication::new(instance.id).with_priority(1))
        .await
        .unwrap();
    fx.publications
        .create(NewPublication::new(other.id))
        .await
        .unwrap();

    let listed = fx.publications.retrieve_by_instance(instance.id).await.unwrap();
    assert_eq!(listed, vec![high, low, low_again]);
}

#[tokio::test]
async fn reparenting_update_validates_new_instance() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    let target = fx.instances.create(NewInstance::new("proj-2")).await.unwrap();
    let publication = fx
        .publications
        .create(NewPublication::new(instance.id))
        .await
        .unwrap();
    fx.recorder.clear();

    let bad = PublicationPatch {
        instance_id: Some(404),
        ..PublicationPatch::default()
    };
    let err = fx.publications.update(publication.id, bad).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(fx.recorder.is_empty());
    assert_eq!(
        fx.publications.retrieve_one(publication.id).await.unwrap(),
        publication
    );

    let good = PublicationPatch {
        instance_id: Some(target.id),
        priority: Some(3),
    };
    let moved = fx.publications.update(publication.id, good).await.unwrap();
    assert_eq!(moved.instance_id, target.id);
    assert_eq!(moved.priority, 3);
    assert_eq!(fx.recorder.len(), 1);
}

#[tokio::test]
async fn user_lifecycle_round_trip() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    fx.recorder.clear();

    let user = fx
        .users
        .create(NewUser::new(instance.id, "  ada  ").with_email("ada@example.com"))
        .await
        .unwrap();
    assert_eq!(user.username, "ada");
    assert_eq!(user.email.as_deref(), Some("ada@example.com"));

    let patch = UserPatch {
        email: Some(None),
        ..UserPatch::default()
    };
    let updated = fx.users.update(user.id, patch).await.unwrap();
    assert_eq!(updated.email, None);

    assert!(fx.users.delete(user.id).await.unwrap());
    assert!(fx.users.retrieve_one(user.id).await.unwrap_err().is_not_found());

    let kinds: Vec<&str> = fx.recorder.kinds().iter().map(|kind| kind.as_str()).collect();
    assert_eq!(kinds, vec!["user.created", "user.updated", "user.deleted"]);
    let events = fx.recorder.events();
    assert_eq!(events[0], user_created(&user));
    assert_eq!(events[1], user_updated(&updated));
}

#[tokio::test]
async fn duplicate_username_within_instance_is_rejected() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    let other = fx.instances.create(NewInstance::new("proj-2")).await.unwrap();
    fx.users
        .create(NewUser::new(instance.id, "ada"))
        .await
        .unwrap();
    fx.recorder.clear();

    let err = fx
        .users
        .create(NewUser::new(instance.id, "ada"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationFailure(_)));
    assert!(fx.recorder.is_empty());

    fx.users.create(NewUser::new(other.id, "ada")).await.unwrap();
    assert_eq!(fx.users.retrieve_by_instance(other.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_username_is_a_validation_failure() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();

    let err = fx
        .users
        .create(NewUser::new(instance.id, "   "))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "validation_failure");
}

#[tokio::test]
async fn task_create_requires_existing_publication() {
    let fx = fixture();

    let err = fx.tasks.create(NewTask::new(404, "draft")).await.unwrap_err();

    assert_eq!(err, ServiceError::not_found(EntityKind::Publication, 404));
    assert!(fx.recorder.is_empty());
}

#[tokio::test]
async fn tasks_scope_to_their_publication() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    let first = fx
        .publications
        .create(NewPublication::new(instance.id))
        .await
        .unwrap();
    let second = fx
        .publications
        .create(NewPublication::new(instance.id))
        .await
        .unwrap();
    fx.recorder.clear();

    let task = fx
        .tasks
        .create(NewTask::new(first.id, "write copy"))
        .await
        .unwrap();
    assert_eq!(fx.recorder.events(), vec![task_created(&task)]);

    let patch = TaskPatch {
        publication_id: Some(second.id),
        title: Some("review copy".to_string()),
    };
    let moved = fx.tasks.update(task.id, patch).await.unwrap();
    assert_eq!(moved.publication_id, second.id);
    assert_eq!(moved.title, "review copy");

    assert!(fx.tasks.retrieve_by_publication(first.id).await.unwrap().is_empty());
    assert_eq!(
        fx.tasks.retrieve_by_publication(second.id).await.unwrap(),
        vec![moved]
    );
}

#[tokio::test]
async fn moving_user_to_missing_instance_changes_nothing() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    let target = fx.instances.create(NewInstance::new("proj-2")).await.unwrap();
    let user = fx
        .users
        .create(NewUser::new(instance.id, "ada"))
        .await
        .unwrap();
    fx.recorder.clear();

    let bad = UserPatch {
        instance_id: Some(404),
        username: Some("grace".to_string()),
        ..UserPatch::default()
    };
    let err = fx.users.update(user.id, bad).await.unwrap_err();
    assert_eq!(err, ServiceError::not_found(EntityKind::Instance, 404));
    assert!(fx.recorder.is_empty());
    assert_eq!(fx.users.retrieve_one(user.id).await.unwrap(), user);

    let good = UserPatch {
        instance_id: Some(target.id),
        ..UserPatch::default()
    };
    let moved = fx.users.update(user.id, good).await.unwrap();
    assert_eq!(moved.instance_id, target.id);
    assert_eq!(moved.username, "ada");
    assert_eq!(fx.recorder.events(), vec![user_updated(&moved)]);
    assert!(fx.users.retrieve_by_instance(instance.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn task_delete_removes_row_and_publishes() {
    let fx = fixture();
    let instance = fx.instances.create(NewInstance::new("proj-1")).await.unwrap();
    let publication = fx
        .publications
        .create(NewPublication::new(instance.id))
        .await
        .unwrap();
    let task = fx
        .tasks
        .create(NewTask::new(publication.id, "ship"))
        .await
        .unwrap();
    fx.recorder.clear();

    assert!(fx.tasks.delete(task.id).await.unwrap());

    assert_eq!(fx.recorder.events(), vec![task_deleted(task.id)]);
    assert!(fx.tasks.retrieve_one(task.id).await.unwrap_err().is_not_found());
    assert!(fx
        .tasks
        .retrieve_by_publication(publication.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        fx.publications.retrieve_one(publication.id).await.unwrap(),
        publication
    );
}
