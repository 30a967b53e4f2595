//! Task store: SQLite persistence for the task list (schema init, CRUD).
//!
//! Uses a single `Mutex<Connection>` — safe to share across async tasks via
//! `Arc<TaskStore>` since all operations take the lock synchronously.
//! (rusqlite `Connection` is `Send` but not `Sync`.) Concurrent writers are
//! serialized by SQLite's own transaction mechanism; this layer adds no
//! write ordering of its own.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Store errors. Messages are safe to forward to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("db open: {0}")]
    Open(String),
    #[error("db: {0}")]
    Query(String),
    #[error("db lock poisoned")]
    Lock,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Task status. Writes are restricted to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Done,
    Notneeded,
}

/// Task priority. Writes are restricted to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Allowed wire values, in declaration order (descriptor enum specs).
pub const STATUS_VALUES: &[&str] = &["pending", "done", "notneeded"];
pub const PRIORITY_VALUES: &[&str] = &["low", "medium", "high"];

impl Status {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Status::Pending),
            "done" => Some(Status::Done),
            "notneeded" => Some(Status::Notneeded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Done => "done",
            Status::Notneeded => "notneeded",
        }
    }
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// One task row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`, validated before it reaches the store.
    pub created_date: String,
    pub status: Status,
    pub priority: Priority,
}

/// Fields for a new task, already validated by the tool layer.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub created_date: String,
    pub status: Status,
    pub priority: Priority,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

// ---------------------------------------------------------------------------
// TaskStore
// ---------------------------------------------------------------------------

/// Persistent SQLite task store.
pub struct TaskStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore").finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Open (or create) the task database at `path`.
    /// Creates the parent directory if it does not exist.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Open(format!("create_dir_all: {e}")))?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Open(format!("open {}: {e}", path.display())))?;

        // WAL + NORMAL sync: durable, readers never block the writer.
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                title        TEXT NOT NULL,
                description  TEXT NOT NULL DEFAULT '',
                created_date TEXT NOT NULL,
                status       TEXT NOT NULL DEFAULT 'pending'
                             CHECK (status IN ('pending', 'done', 'notneeded')),
                priority     TEXT NOT NULL DEFAULT 'medium'
                             CHECK (priority IN ('low', 'medium', 'high'))
            );",
        )?;
        Ok(())
    }

    /// Insert a task; returns the assigned id.
    pub fn add(&self, task: &NewTask) -> Result<i64, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        conn.execute(
            "INSERT INTO tasks (title, description, created_date, status, priority)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.title,
                task.description,
                task.created_date,
                task.status.as_str(),
                task.priority.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All tasks, most recent first (ties broken by highest id).
    pub fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, created_date, status, priority
             FROM tasks
             ORDER BY created_date DESC, id DESC",
        )?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Tasks with the given priority, most recent first.
    pub fn list_by_priority(&self, priority: Priority) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, created_date, status, priority
             FROM tasks
             WHERE priority = ?1
             ORDER BY created_date DESC, id DESC",
        )?;
        let tasks = stmt
            .query_map(params![priority.as_str()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Apply a partial update; returns the number of rows changed (0 or 1).
    pub fn update(&self, id: i64, patch: &TaskPatch) -> Result<usize, StoreError> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(title) = &patch.title {
            sets.push("title = ?");
            values.push(Box::new(title.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(Box::new(status.as_str().to_string()));
        }
        if let Some(priority) = patch.priority {
            sets.push("priority = ?");
            values.push(Box::new(priority.as_str().to_string()));
        }
        if sets.is_empty() {
            return Ok(0);
        }
        values.push(Box::new(id));

        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let rows = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(rows)
    }

    /// Delete a task; returns the number of rows removed (0 or 1).
    pub fn delete(&self, id: i64) -> Result<usize, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(rows)
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let status: String = row.get(4)?;
    let priority: String = row.get(5)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_date: row.get(3)?,
        // CHECK constraints uphold membership; the fallback is unreachable
        status: Status::parse(&status).unwrap_or(Status::Pending),
        priority: Priority::parse(&priority).unwrap_or(Priority::Medium),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, TaskStore) {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let store = TaskStore::open(&tmp.path().join("tasks.db")).expect("open store");
        (tmp, store)
    }

    fn sample(title: &str, date: &str, priority: Priority) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "desc".to_string(),
            created_date: date.to_string(),
            status: Status::Pending,
            priority,
        }
    }

    #[test]
    fn add_assigns_monotonic_ids() {
        let (_tmp, store) = open_store();
        let a = store.add(&sample("a", "2024-01-01", Priority::Low)).unwrap();
        let b = store.add(&sample("b", "2024-01-01", Priority::Low)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn list_all_orders_by_date_then_id_descending() {
        let (_tmp, store) = open_store();
        store.add(&sample("old", "2024-01-01", Priority::Low)).unwrap();
        store.add(&sample("new", "2024-06-01", Priority::Low)).unwrap();
        store.add(&sample("tie", "2024-06-01", Priority::Low)).unwrap();
        let titles: Vec<String> = store.list_all().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["tie", "new", "old"]);
    }

    #[test]
    fn list_by_priority_filters() {
        let (_tmp, store) = open_store();
        store.add(&sample("hi", "2024-01-01", Priority::High)).unwrap();
        store.add(&sample("lo", "2024-01-02", Priority::Low)).unwrap();
        let tasks = store.list_by_priority(Priority::High).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "hi");
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let (_tmp, store) = open_store();
        let id = store.add(&sample("t", "2024-01-01", Priority::Low)).unwrap();
        let rows = store
            .update(
                id,
                &TaskPatch {
                    status: Some(Status::Done),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(rows, 1);
        let task = &store.list_all().unwrap()[0];
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.title, "t");
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn update_and_delete_report_zero_rows_for_missing_id() {
        let (_tmp, store) = open_store();
        let rows = store
            .update(
                999,
                &TaskPatch {
                    title: Some("x".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(rows, 0);
        assert_eq!(store.delete(999).unwrap(), 0);
    }

    #[test]
    fn empty_patch_touches_nothing() {
        let (_tmp, store) = open_store();
        let id = store.add(&sample("t", "2024-01-01", Priority::Low)).unwrap();
        assert_eq!(store.update(id, &TaskPatch::default()).unwrap(), 0);
    }
}
