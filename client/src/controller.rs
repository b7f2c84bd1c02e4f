//! Runs a `TodoList` against a caller.

use todo_core::{Call, TodoApi, TodoList};

/// Owns a list and the caller it talks to. Every action runs its call and
/// any follow-up refetch to completion before returning; failures are
/// absorbed by the list.
pub struct TodoListController<A> {
    api: A,
    list: TodoList,
}

impl<A: TodoApi> TodoListController<A> {
    pub fn new(api: A, list: TodoList) -> Self {
        Self { api, list }
    }

    pub fn list(&self) -> &TodoList {
        &self.list
    }

    pub fn into_list(self) -> TodoList {
        self.list
    }

    pub async fn mount(&mut self) {
        let call = self.list.mount();
        self.drive(call).await;
    }

    pub async fn reconnect(&mut self) {
        let call = self.list.reconnect();
        self.drive(call).await;
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.list.set_draft(text);
    }

    pub async fn submit(&mut self) {
        let call = self.list.submit();
        self.drive(call).await;
    }

    pub async fn toggle(&mut self, id: i64) {
        let call = self.list.toggle(id);
        self.drive(call).await;
    }

    async fn drive(&mut self, mut next: Option<Call>) {
        while let Some(call) = next.take() {
            let result = self.api.call(call.clone()).await;
            next = self.list.settle(&call, result);
        }
    }
}
