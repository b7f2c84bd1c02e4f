//! In-process implementation of the calling contract.
//!
//! Server-side rendering uses this instead of the network. Calls go through
//! `TodoRouter::dispatch` and errors are converted through the same wire
//! shape the HTTP endpoint emits, so a caller cannot tell the two paths apart.

use async_trait::async_trait;
use todo_core::{ApiError, Call, Reply, TodoApi, TodoList};

use crate::router::TodoRouter;

#[derive(Clone)]
pub struct ServerCaller {
    router: TodoRouter,
}

impl ServerCaller {
    pub fn new(router: TodoRouter) -> Self {
        Self { router }
    }

    /// Fetch the list once while rendering and hand the client a list that
    /// will not refetch on mount.
    pub async fn prefetch_todo_list(&self) -> Result<TodoList, ApiError> {
        Ok(TodoList::with_initial(self.get_todos().await?))
    }
}

#[async_trait]
impl TodoApi for ServerCaller {
    async fn call(&self, call: Call) -> Result<Reply, ApiError> {
        let path = call.procedure().path();
        let data = self
            .router
            .dispatch(call.kind(), path, call.input())
            .await
            .map_err(|err| ApiError::from(err.to_shape(path)))?;
        call.decode_output(data)
    }
}
