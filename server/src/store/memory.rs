use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use todo_core::Todo;

use super::{NewTodo, StoreError, TodoPatch, TodoStore};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Todo>,
}

/// Process-local store; ids start at 1 and rows come back in id order.
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn find_many(&self) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn create(&self, data: NewTodo) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let todo = Todo {
            id: table.last_id,
            content: data.content,
            done: data.done,
        };
        table.rows.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        let todo = table.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        todo.done = patch.done;
        Ok(todo.clone())
    }
}
