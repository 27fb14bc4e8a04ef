//! SQLite repository for tasks (leaf records, nothing to cascade).

use super::{run_blocking, Assignments, RepoError, RepoResult, Repository};
use crate::db::Database;
use crate::model::{EntityId, Pending, Task, TaskFilter, TaskPatch};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT id, publication_id, title FROM tasks";

#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    db: Database,
}

impl SqliteTaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<Task> for SqliteTaskRepository {
    async fn find_one(&self, id: EntityId) -> RepoResult<Option<Task>> {
        run_blocking(&self.db, "task_find_one", move |conn| select_task(conn, id)).await
    }

    async fn find(&self, filter: TaskFilter) -> RepoResult<Vec<Task>> {
        run_blocking(&self.db, "task_find", move |conn| {
            let (sql, publication_id) = match filter {
                TaskFilter::All => (format!("{TASK_SELECT_SQL} ORDER BY id ASC;"), None),
                TaskFilter::Publication(publication_id) => (
                    format!("{TASK_SELECT_SQL} WHERE publication_id = ?1 ORDER BY id ASC;"),
                    Some(publication_id),
                ),
            };

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = match publication_id {
                Some(publication_id) => stmt.query([publication_id])?,
                None => stmt.query([])?,
            };
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(parse_task_row(row)?);
            }
            Ok(tasks)
        })
        .await
    }

    async fn save(&self, pending: Pending<Task>) -> RepoResult<Task> {
        let draft = pending.into_draft();
        run_blocking(&self.db, "task_save", move |conn| {
            conn.execute(
                "INSERT INTO tasks (publication_id, title) VALUES (?1, ?2);",
                params![draft.publication_id, draft.title],
            )?;
            let id = conn.last_insert_rowid();
            select_task(conn, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("task {id} missing right after insert"))
            })
        })
        .await
    }

    async fn update(&self, id: EntityId, patch: TaskPatch) -> RepoResult<()> {
        run_blocking(&self.db, "task_update", move |conn| {
            let mut assignments = Assignments::default();
            if let Some(publication_id) = patch.publication_id {
                assignments.set("publication_id", Value::Integer(publication_id));
            }
            if let Some(title) = patch.title {
                assignments.set("title", Value::Text(title));
            }
            assignments.apply(conn, "tasks", id)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        run_blocking(&self.db, "task_delete", move |conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
            Ok(())
        })
        .await
    }
}

fn select_task(conn: &Connection, id: EntityId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_task_row(row)?)),
        None => Ok(None),
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: row.get("id")?,
        publication_id: row.get("publication_id")?,
        title: row.get("title")?,
    })
}
