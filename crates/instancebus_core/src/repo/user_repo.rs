//! SQLite repository for instance users.
//!
//! # Invariants
//! - `(instance_id, username)` is unique; duplicates are validation errors.
//! - Usernames are stored trimmed.

use super::{run_blocking, Assignments, RepoError, RepoResult, Repository};
use crate::db::Database;
use crate::model::{EntityId, Pending, User, UserFilter, UserPatch};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT id, instance_id, username, email FROM users";

#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    db: Database,
}

impl SqliteUserRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<User> for SqliteUserRepository {
    async fn find_one(&self, id: EntityId) -> RepoResult<Option<User>> {
        run_blocking(&self.db, "user_find_one", move |conn| select_user(conn, id)).await
    }

    async fn find(&self, filter: UserFilter) -> RepoResult<Vec<User>> {
        run_blocking(&self.db, "user_find", move |conn| {
            let (sql, instance_id) = match filter {
                UserFilter::All => (format!("{USER_SELECT_SQL} ORDER BY id ASC;"), None),
                UserFilter::Instance(instance_id) => (
                    format!("{USER_SELECT_SQL} WHERE instance_id = ?1 ORDER BY id ASC;"),
                    Some(instance_id),
                ),
            };

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = match instance_id {
                Some(instance_id) => stmt.query([instance_id])?,
                None => stmt.query([])?,
            };
            let mut users = Vec::new();
            while let Some(row) = rows.next()? {
                users.push(parse_user_row(row)?);
            }
            Ok(users)
        })
        .await
    }

    async fn save(&self, pending: Pending<User>) -> RepoResult<User> {
        let draft = pending.into_draft();
        run_blocking(&self.db, "user_save", move |conn| {
            conn.execute(
                "INSERT INTO users (instance_id, username, email) VALUES (?1, ?2, ?3);",
                params![draft.instance_id, draft.username.trim(), draft.email],
            )?;
            let id = conn.last_insert_rowid();
            select_user(conn, id)?.ok_or_else(|| {
                RepoError::InvalidData(format!("user {id} missing right after insert"))
            })
        })
        .await
    }

    async fn update(&self, id: EntityId, patch: UserPatch) -> RepoResult<()> {
        run_blocking(&self.db, "user_update", move |conn| {
            let mut assignments = Assignments::default();
            if let Some(instance_id) = patch.instance_id {
                assignments.set("instance_id", Value::Integer(instance_id));
            }
            if let Some(username) = patch.username {
                assignments.set("username", Value::Text(username.trim().to_string()));
            }
            if let Some(email) = patch.email {
                assignments.set_text("email", email);
            }
            assignments.apply(conn, "users", id)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: EntityId) -> RepoResult<()> {
        run_blocking(&self.db, "user_delete", move |conn| {
            conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
            Ok(())
        })
        .await
    }
}

fn select_user(conn: &Connection, id: EntityId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_user_row(row)?)),
        None => Ok(None),
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        instance_id: row.get("instance_id")?,
        username: row.get("username")?,
        email: row.get("email")?,
    })
}
