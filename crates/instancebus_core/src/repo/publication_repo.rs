//! SQLite repository for publications.
//!
//! # Invariants
//! - Deleting a publication removes its tasks in the same transaction.
//! - `instance_id` must reference an existing instance (foreign key).

use super::{run_blocking, Assignments, RepoError, RepoResult, Repository};
use crate::db::Database;
use crate::model::{EntityId, Pending, Publication, PublicationFilter, PublicationPatch};
use async_trait::async_trait;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const PUBLICATION_SELECT_SQL: &str = "SELECT id, instance_id, priority FROM publications";

#[derive(Debug, Clone)]
pub struct SqlitePublicationRepository {
    db: Database,
}

impl SqlitePublicationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<Publication> for SqlitePublicationRepository {
    async fn find_one(&self, id: EntityId) -> RepoResult<Option<Publication>> {
        run_blocking(&self.db, "publication_find_one", move |conn| {
            select_publication(conn, id)
        })
        .await
    }

    async fn find(&self, filter: PublicationFilter) -> RepoResult<Vec<Publication>> {
        run_blocking(&self.db, "publication_find", move |conn| {
            let mut publications = Vec::new();
            match filter {
                PublicationFilter::All => {
                    let mut stmt =
                        conn.prepare(&format!("{PUBLICATION_SELECT_SQL} ORDER BY id ASC;"))?;
                    let mut rows = stmt.query([])?;
                    while let Some(row) = rows.next()? {
                        publications.push(parse_publication_row(row)?);
                    }
                }
                PublicationFilter::Instance(instance_id) => {
                    // Highest priority first; ties keep creation order.
                    let mut stmt = conn.prepare(&format!(
                        "{PUBLICATION_SELECT_SQL}
                         WHERE instance_id = ?1
                         ORDER BY priority DESC, id ASC;"
                    ))?;
                    let mut rows = stmt.query([instance_id])?;
                    while let Some(row) = rows.next()? {
                        publications.push(parse_publication_row(row)?);
                    }
                }
            }
            Ok(publications)
        })
        .await
    }

    async fn save(&self, pending: Pending<Publication>) -> RepoResult<Publication> {
        let draft = pending.into_draft();
        run_blocking(&self.db, "publication_save", move |conn| {
            conn.execute(
                "INSERT INTO publications (instance_id, priority) VALUES (?1, ?2);",
                params![draft.instance_id, draft.priority],
            )?;
            let id = conn.last_insert_rowid();
            select_publication(conn, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("publication {id} missing right after insert"))
            })
        })
        .await
    }

    async fn update(&self, id: EntityId, patch: PublicationPatch) -> RepoResult<()> {
        run_blocking(&self.db, "publication_update", move |conn| {
            let mut assignments = Assignments::default();
            if let Some(instance_id) = patch.instance_id {
                assignments.set("instance_id", Value::Integer(instance_id));
            }
            if let Some(priority) = patch.priority {
                assignments.set("priority", Value::Integer(priority));
            }
            let changed = assignments.apply(conn, "publications", id)?;
            debug!("event=publication_update module=repo id={id} changed={changed}");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        run_blocking(&self.db, "publication_delete", move |conn| {
            let tx = conn.transaction()?;
            let tasks = tx.execute("DELETE FROM tasks WHERE publication_id = ?1;", [id])?;
            let publications = tx.execute("DELETE FROM publications WHERE id = ?1;", [id])?;
            tx.commit()?;

            debug!(
                "event=publication_delete module=repo id={id} publications={publications} tasks={tasks}"
            );
            Ok(())
        })
        .await
    }
}

fn select_publication(conn: &Connection, id: EntityId) -> RepoResult<Option<Publication>> {
    let mut stmt = conn.prepare(&format!("{PUBLICATION_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_publication_row(row)?)),
        None => Ok(None),
    }
}

fn parse_publication_row(row: &Row<'_>) -> RepoResult<Publication> {
    Ok(Publication {
        id: row.get("id")?,
        instance_id: row.get("instance_id")?,
        priority: row.get("priority")?,
    })
}
