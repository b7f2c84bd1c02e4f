//! Data-access seam between the procedure router and durable storage.

use async_trait::async_trait;
use todo_core::Todo;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Row data for `create`. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub content: String,
    pub done: bool,
}

/// Fields `update` may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoPatch {
    pub done: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo {0} not found")]
    NotFound(i64),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage backend: {0}")]
    Backend(String),
}

/// The single `todos` table.
///
/// Writes to one row are assumed to be serialized by the implementation;
/// nothing spans more than one statement.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every row, in storage order.
    async fn find_many(&self) -> Result<Vec<Todo>, StoreError>;

    async fn create(&self, data: NewTodo) -> Result<Todo, StoreError>;

    /// Fails with `StoreError::NotFound` when no row has `id`.
    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError>;
}
