use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use todo_core::Todo;

use super::{NewTodo, StoreError, TodoPatch, TodoStore};

/// SQLite-backed store over one shared connection.
///
/// Statements run on tokio's blocking pool; the mutex serializes them.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create db dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("failed to open db {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory db")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn find_many(&self) -> Result<Vec<Todo>, StoreError> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, content, done FROM todos ORDER BY id ASC")?;
            let rows = stmt.query_map([], row_to_todo)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn create(&self, data: NewTodo) -> Result<Todo, StoreError> {
        self.run(move |conn| {
            Ok(conn.query_row(
                "INSERT INTO todos (content, done) VALUES (?1, ?2) RETURNING id, content, done",
                params![data.content, data.done],
                row_to_todo,
            )?)
        })
        .await
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        self.run(move |conn| {
            conn.query_row(
                "UPDATE todos SET done = ?1 WHERE id = ?2 RETURNING id, content, done",
                params![patch.done, id],
                row_to_todo,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
        })
        .await
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS todos (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  content TEXT NOT NULL,
  done INTEGER NOT NULL DEFAULT 0
);
"#,
    )
    .context("failed to initialize schema")?;
    Ok(())
}

fn row_to_todo(row: &Row) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get("id")?,
        content: row.get("content")?,
        done: row.get("done")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(content: &str) -> NewTodo {
        NewTodo {
            content: content.to_string(),
            done: false,
        }
    }

    #[tokio::test]
    async fn sqlite_store_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = SqliteStore::open(tmp.path()).unwrap();

        let todo = store.create(new_todo("hello")).await.unwrap();
        assert_eq!(todo.id, 1);
        assert!(!todo.done);
        assert_eq!(store.find_many().await.unwrap(), vec![todo.clone()]);

        let updated = store.update(todo.id, TodoPatch { done: true }).await.unwrap();
        assert!(updated.done);
        assert_eq!(updated.content, "hello");
    }

    #[tokio::test]
    async fn rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("todos.sqlite");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.create(new_todo("persisted")).await.unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let rows = store.find_many().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "persisted");
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.update(3, TodoPatch { done: true }).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(3)));
        assert!(store.find_many().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_content_is_stored() {
        let store = SqliteStore::open_in_memory().unwrap();
        let todo = store.create(new_todo("")).await.unwrap();
        assert_eq!(todo.content, "");
    }
}
