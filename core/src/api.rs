//! The calling contract shared by the in-process caller and network links.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::procedure::{Call, Reply};
use crate::types::{SetDone, Todo};

/// Anything that can run a procedure call and hand back its typed reply.
///
/// Implementors only provide `call`; the typed methods are derived from it so
/// every caller decodes replies the same way.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn call(&self, call: Call) -> Result<Reply, ApiError>;

    async fn get_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.call(Call::GetTodos).await?.into_todos()
    }

    async fn add_todo(&self, content: String) -> Result<Todo, ApiError> {
        self.call(Call::AddTodo(content)).await?.into_todo()
    }

    async fn set_done(&self, input: SetDone) -> Result<Todo, ApiError> {
        self.call(Call::SetDone(input)).await?.into_todo()
    }
}

#[async_trait]
impl<T: TodoApi + ?Sized> TodoApi for std::sync::Arc<T> {
    async fn call(&self, call: Call) -> Result<Reply, ApiError> {
        (**self).call(call).await
    }
}
