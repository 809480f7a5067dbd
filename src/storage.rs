//! Local persistence for departments, members, tasks, and the activity journal.
//!
//! Everything lives in one `SQLite` file:
//!
//! ```text
//! departments       # organization table, parent_id self-reference
//! members           # people; department matched by name
//! roles             # member_id -> role name
//! tasks             # objectives plus cached actual/achievement
//! task_managers     # task <-> member links, in assignment order
//! task_activities   # one row per (task, year, month)
//! ```
//!
//! Decimal columns are stored as text so no precision is lost.

mod activity;
mod org;
mod task;

use std::{io, path::Path, path::PathBuf, str::FromStr};

use bigdecimal::BigDecimal;
use rusqlite::Connection;

use crate::model::{DepartmentId, Period, TaskActivity, TaskId};
use crate::prefetch::RowStore;

pub use task::TaskFilter;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("department not found: {0}")]
    DepartmentNotFound(DepartmentId),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS departments (
        id          INTEGER PRIMARY KEY,
        name        TEXT NOT NULL,
        parent_id   INTEGER,
        depth       INTEGER NOT NULL DEFAULT 0,
        active      INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS members (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        department_name TEXT,
        position_name   TEXT,
        active          INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS roles (
        member_id   TEXT PRIMARY KEY,
        role        TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS tasks (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        task_type           TEXT NOT NULL,
        category1           TEXT,
        category2           TEXT,
        name                TEXT NOT NULL,
        description         TEXT,
        start_date          TEXT,
        end_date            TEXT,
        performance_type    TEXT,
        evaluation          TEXT NOT NULL,
        metric              TEXT,
        target_value        TEXT NOT NULL DEFAULT '0',
        actual_value        TEXT NOT NULL DEFAULT '0',
        achievement         TEXT NOT NULL DEFAULT '0',
        status              TEXT NOT NULL DEFAULT 'inProgress',
        active              INTEGER NOT NULL DEFAULT 1,
        visible             INTEGER NOT NULL DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS task_managers (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id     INTEGER NOT NULL REFERENCES tasks(id),
        member_id   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS task_managers_task ON task_managers (task_id);
    CREATE TABLE IF NOT EXISTS task_activities (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id         INTEGER NOT NULL REFERENCES tasks(id),
        member_id       TEXT NOT NULL,
        year            INTEGER NOT NULL,
        month           INTEGER NOT NULL,
        content         TEXT,
        actual_value    TEXT,
        UNIQUE (task_id, year, month)
    );
";

/// `SQLite`-backed store for everything taskboard reads and writes.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// The parent directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory can't be created or the
    /// database can't be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// A throwaway database, used by tests.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` fails to initialize.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Returns the default database path: `~/.taskboard/taskboard.sqlite`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".taskboard").join("taskboard.sqlite"))
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl RowStore for Storage {
    type Error = StorageError;

    fn departments(&self) -> Result<Vec<crate::model::Department>> {
        self.load_departments()
    }

    fn activities_in_period(&self, task_ids: &[TaskId], period: Period) -> Result<Vec<TaskActivity>> {
        self.load_activities_in_period(task_ids, period)
    }

    fn activity_history(&self, task_ids: &[TaskId]) -> Result<Vec<TaskActivity>> {
        self.load_activity_history(task_ids)
    }
}

/// Binds a whole id set as one JSON array parameter, read back with
/// `IN (SELECT value FROM json_each(?))`. Keeps working sets of any size
/// under `SQLite`'s bound-variable limit.
fn id_array(ids: &[TaskId]) -> Result<String> {
    serde_json::to_string(ids).map_err(|e| StorageError::Corrupt(format!("id list: {e}")))
}

fn parse_decimal(column: &str, value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value)
        .map_err(|e| StorageError::Corrupt(format!("invalid {column} '{value}': {e}")))
}

fn parse_period(year: i16, month: i8) -> Result<Period> {
    Period::new(year, month)
        .ok_or_else(|| StorageError::Corrupt(format!("invalid period {year}-{month}")))
}
