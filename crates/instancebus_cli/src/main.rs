//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, store, event bus and services the way an embedding host would.
//! - Run one instance through create/update/delete and print each event as JSON
//!   (or log it, with `event_sink = "log"`).
//!
//! Usage: `instancebus_cli [config.toml]`. Without a config the store lives in
//! memory and file logging stays off.

use instancebus_core::{
    core_version, init_from_config, BroadcastNotifier, CoreConfig, Database, DomainEvent,
    EventSink, InstancePatch, LogNotifier, NewInstance, ServiceRegistry, SharedNotifier,
};
use log::info;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::Receiver;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    let file_logging = init_from_config(&config)?;

    let db = match config.database_path.as_ref() {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    let (notifier, events): (SharedNotifier, Option<Receiver<DomainEvent>>) =
        match config.event_sink {
            EventSink::Broadcast => {
                let bus = Arc::new(BroadcastNotifier::new(config.event_channel_capacity));
                let events = bus.subscribe();
                (bus as SharedNotifier, Some(events))
            }
            EventSink::Log => (Arc::new(LogNotifier) as SharedNotifier, None),
        };

    let registry = ServiceRegistry::new().with_delete_policy(config.delete_policy);
    let instances = registry.instance_service(&db, notifier);
    info!(
        "event=cli_start module=cli status=ok file_logging={file_logging} sink={:?}",
        config.event_sink
    );
    println!("instancebus_core version={}", core_version());

    let created = instances
        .create(NewInstance::new("demo-project").with_name("smoke"))
        .await?;
    let patch = InstancePatch {
        name: Some(Some("smoke-renamed".to_string())),
        ..InstancePatch::default()
    };
    instances.update(created.id, patch).await?;
    instances.delete(created.id).await?;

    let Some(mut events) = events else {
        return Ok(());
    };
    loop {
        match events.try_recv() {
            Ok(event) => println!("{} {}", event.kind(), event.to_json()?),
            Err(TryRecvError::Lagged(skipped)) => println!("lagged skipped={skipped}"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    Ok(())
}
