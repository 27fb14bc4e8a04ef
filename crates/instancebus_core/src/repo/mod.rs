//! Persistence gateway contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the per-record repository contract services depend on.
//! - Keep SQL details inside the persistence boundary.
//! - Own cascade deletion for aggregate roots.
//!
//! # Invariants
//! - `update` and `delete` on a missing id are no-ops, not errors.
//! - Constraint violations surface as `RepoError::Validation`.
//! - Read paths reject corrupt persisted state instead of masking it.

use crate::db::{Database, DbError};
use crate::model::{EntityId, Pending, Record};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use thiserror::Error;

pub mod instance_repo;
pub mod publication_repo;
pub mod task_repo;
pub mod user_repo;

pub use instance_repo::SqliteInstanceRepository;
pub use publication_repo::SqlitePublicationRepository;
pub use task_repo::SqliteTaskRepository;
pub use user_repo::SqliteUserRepository;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    /// Input rejected by a store constraint (check, foreign key, unique).
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    /// The store could not be reached (lock poisoned, worker task lost).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(err, message) = &value {
            if err.code == ErrorCode::ConstraintViolation {
                return Self::Validation(message.clone().unwrap_or_else(|| err.to_string()));
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository contract for one record type.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Loads one record by primary key.
    async fn find_one(&self, id: EntityId) -> RepoResult<Option<R>>;

    /// Lists records in the given scope, ordered by id.
    async fn find(&self, filter: R::Filter) -> RepoResult<Vec<R>>;

    /// Builds an unsaved record from its draft. Touches no storage.
    fn create(&self, draft: R::Draft) -> Pending<R> {
        Pending::new(draft)
    }

    /// Inserts a pending record and returns it with its assigned id.
    async fn save(&self, pending: Pending<R>) -> RepoResult<R>;

    /// Applies a partial update. Missing ids are ignored.
    async fn update(&self, id: EntityId, patch: R::Patch) -> RepoResult<()>;

    /// Deletes a record and everything it owns. Missing ids are ignored.
    async fn delete(&self, id: EntityId) -> RepoResult<()>;
}

/// Runs one unit of SQLite work off the async executor.
pub(crate) async fn run_blocking<T, F>(db: &Database, op: &'static str, work: F) -> RepoResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> RepoResult<T> + Send + 'static,
{
    let conn = db.connection();
    tokio::task::spawn_blocking(move || {
        let mut guard = conn
            .lock()
            .map_err(|_| RepoError::Unavailable(format!("{op}: connection lock poisoned")))?;
        work(&mut *guard)
    })
    .await
    .map_err(|err| RepoError::Unavailable(format!("{op}: worker task failed: {err}")))?
}

/// Column assignments collected from a patch.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Assignments {
    pub(crate) fn set(&mut self, column: &'static str, value: Value) {
        self.columns.push(column);
        self.values.push(value);
    }

    pub(crate) fn set_text(&mut self, column: &'static str, value: Option<String>) {
        self.set(column, value.map_or(Value::Null, Value::Text));
    }

    /// Executes `UPDATE <table> SET ... WHERE id = ?` when anything is set.
    pub(crate) fn apply(self, conn: &Connection, table: &str, id: EntityId) -> RepoResult<usize> {
        if self.columns.is_empty() {
            return Ok(0);
        }

        let set_clause = self
            .columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table}
             SET {set_clause}, updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?;"
        );

        let mut values = self.values;
        values.push(Value::Integer(id));
        let changed = conn.execute(&sql, params_from_iter(values))?;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::RepoError;

    #[test]
    fn constraint_violation_maps_to_validation() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT NOT NULL CHECK (length(v) > 0));")
            .unwrap();
        let err: RepoError = conn
            .execute("INSERT INTO t (v) VALUES ('');", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn other_sqlite_errors_map_to_db() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: RepoError = conn
            .execute("SELECT * FROM missing_table;", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepoError::Db(_)));
    }
}
