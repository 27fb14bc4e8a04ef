//! SQLite repository for instances, including aggregate cascade deletion.
//!
//! # Invariants
//! - Deleting an instance removes its publications, their tasks and its
//!   users in the same transaction, children first.
//! - `metadata` is stored as a JSON object string.

use super::{run_blocking, Assignments, RepoError, RepoResult, Repository};
use crate::db::Database;
use crate::model::{EntityId, Instance, InstanceFilter, InstancePatch, Pending};
use async_trait::async_trait;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const INSTANCE_SELECT_SQL: &str = "SELECT id, project_id, name, metadata FROM instances";

/// SQLite-backed instance repository.
#[derive(Debug, Clone)]
pub struct SqliteInstanceRepository {
    db: Database,
}

impl SqliteInstanceRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<Instance> for SqliteInstanceRepository {
    async fn find_one(&self, id: EntityId) -> RepoResult<Option<Instance>> {
        run_blocking(&self.db, "instance_find_one", move |conn| {
            select_instance(conn, id)
        })
        .await
    }

    async fn find(&self, filter: InstanceFilter) -> RepoResult<Vec<Instance>> {
        run_blocking(&self.db, "instance_find", move |conn| {
            let (sql, bind) = match filter {
                InstanceFilter::All => (format!("{INSTANCE_SELECT_SQL} ORDER BY id ASC;"), None),
                InstanceFilter::Project(project_id) => (
                    format!("{INSTANCE_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
                    Some(project_id),
                ),
            };

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = match bind {
                Some(project_id) => stmt.query(params![project_id])?,
                None => stmt.query([])?,
            };
            let mut instances = Vec::new();
            while let Some(row) = rows.next()? {
                instances.push(parse_instance_row(row)?);
            }
            Ok(instances)
        })
        .await
    }

    async fn save(&self, pending: Pending<Instance>) -> RepoResult<Instance> {
        let draft = pending.into_draft();
        run_blocking(&self.db, "instance_save", move |conn| {
            let metadata = encode_metadata(&draft.metadata)?;
            conn.execute(
                "INSERT INTO instances (project_id, name, metadata) VALUES (?1, ?2, ?3);",
                params![draft.project_id, draft.name, metadata],
            )?;
            let id = conn.last_insert_rowid();
            select_instance(conn, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("instance {id} missing right after insert"))
            })
        })
        .await
    }

    async fn update(&self, id: EntityId, patch: InstancePatch) -> RepoResult<()> {
        run_blocking(&self.db, "instance_update", move |conn| {
            let mut assignments = Assignments::default();
            if let Some(project_id) = patch.project_id {
                assignments.set("project_id", Value::Text(project_id));
            }
            if let Some(name) = patch.name {
                assignments.set_text("name", name);
            }
            if let Some(metadata) = patch.metadata {
                assignments.set("metadata", Value::Text(encode_metadata(&metadata)?));
            }
            let changed = assignments.apply(conn, "instances", id)?;
            debug!("event=instance_update module=repo id={id} changed={changed}");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        run_blocking(&self.db, "instance_delete", move |conn| {
            let tx = conn.transaction()?;
            let tasks = tx.execute(
                "DELETE FROM tasks
                 WHERE publication_id IN (SELECT id FROM publications WHERE instance_id = ?1);",
                [id],
            )?;
            let publications =
                tx.execute("DELETE FROM publications WHERE instance_id = ?1;", [id])?;
            let users = tx.execute("DELETE FROM users WHERE instance_id = ?1;", [id])?;
            let instances = tx.execute("DELETE FROM instances WHERE id = ?1;", [id])?;
            tx.commit()?;

            debug!(
                "event=instance_delete module=repo id={id} instances={instances} publications={publications} tasks={tasks} users={users}"
            );
            Ok(())
        })
        .await
    }
}

fn select_instance(conn: &Connection, id: EntityId) -> RepoResult<Option<Instance>> {
    let mut stmt = conn.prepare(&format!("{INSTANCE_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_instance_row(row)?)),
        None => Ok(None),
    }
}

fn parse_instance_row(row: &Row<'_>) -> RepoResult<Instance> {
    let id: EntityId = row.get("id")?;
    let metadata_text: String = row.get("metadata")?;
    let metadata = serde_json::from_str::<BTreeMap<String, String>>(&metadata_text).map_err(
        |err| RepoError::InvalidData(format!("invalid metadata for instance {id}: {err}")),
    )?;

    Ok(Instance {
        id,
        project_id: row.get("project_id")?,
        name: row.get("name")?,
        metadata,
    })
}

fn encode_metadata(metadata: &BTreeMap<String, String>) -> RepoResult<String> {
    serde_json::to_string(metadata)
        .map_err(|err| RepoError::Validation(format!("metadata is not encodable: {err}")))
}

#[cfg(test)]
mod tests {
    use super::SqliteInstanceRepository;
    use crate::db::Database;
    use crate::model::{InstanceFilter, InstancePatch, NewInstance};
    use crate::repo::{RepoError, Repository};

    fn repo() -> (Database, SqliteInstanceRepository) {
        let db = Database::open_in_memory().unwrap();
        (db.clone(), SqliteInstanceRepository::new(db))
    }

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let (_db, repo) = repo();
        let first = repo
            .save(repo.create(NewInstance::new("proj-1")))
            .await
            .unwrap();
        let second = repo
            .save(repo.create(NewInstance::new("proj-1")))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn metadata_roundtrips_through_json_column() {
        let (_db, repo) = repo();
        let saved = repo
            .save(repo.create(NewInstance::new("proj-1").with_attribute("region", "eu")))
            .await
            .unwrap();
        let loaded = repo.find_one(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.metadata.get("region").map(String::as_str), Some("eu"));
    }

    #[tokio::test]
    async fn empty_project_id_is_rejected_by_schema() {
        let (_db, repo) = repo();
        let err = repo
            .save(repo.create(NewInstance::new("")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_id_are_noops() {
        let (_db, repo) = repo();
        let patch = InstancePatch {
            name: Some(Some("ghost".to_string())),
            ..InstancePatch::default()
        };
        repo.update(404, patch).await.unwrap();
        repo.delete(404).await.unwrap();
        assert!(repo.find(InstanceFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let (db, repo) = repo();
        let saved = repo
            .save(repo.create(NewInstance::new("proj-1")))
            .await
            .unwrap();
        repo.delete(saved.id).await.unwrap();

        let conn = db.connection();
        let conn = conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM instances;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
