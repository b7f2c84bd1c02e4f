//! The todo list component as an I/O-free state machine.
//!
//! # Design
//! `TodoList` never performs a call itself. User actions return the `Call`
//! to run; the host runs it and feeds the result back through `settle`, which
//! may return a follow-up call (the refetch after a mutation). Failures are
//! swallowed: a failed query keeps the last good list, a failed mutation
//! still triggers the refetch. There is no optimistic update, so the list
//! only ever shows what the server last returned.

use crate::error::ApiError;
use crate::procedure::{Call, Procedure, ProcedureKind, Reply};
use crate::query::{QueryCache, QueryKey, QueryOptions};
use crate::types::{SetDone, Todo};

/// Whether an `addTodo` submitted from this list is still in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone)]
pub struct TodoList {
    cache: QueryCache,
    options: QueryOptions,
    draft: String,
    pending_adds: usize,
}

impl Default for TodoList {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoList {
    /// A list with no data; `mount` fetches it.
    pub fn new() -> Self {
        Self {
            cache: QueryCache::new(),
            options: QueryOptions::default(),
            draft: String::new(),
            pending_adds: 0,
        }
    }

    /// A list seeded with todos fetched during server rendering. Neither
    /// mounting nor reconnecting refetches it.
    pub fn with_initial(todos: Vec<Todo>) -> Self {
        let mut cache = QueryCache::new();
        cache.seed(list_key(), Reply::Todos(todos));
        Self {
            cache,
            options: QueryOptions::prefetched(),
            draft: String::new(),
            pending_adds: 0,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        self.cache
            .get(&list_key())
            .and_then(Reply::as_todos)
            .unwrap_or(&[])
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn phase(&self) -> Phase {
        if self.pending_adds > 0 {
            Phase::Submitting
        } else {
            Phase::Idle
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.cache.is_fetching(&list_key())
    }

    pub fn mount(&mut self) -> Option<Call> {
        if self.cache.get(&list_key()).is_some() && !self.options.refetch_on_mount {
            return None;
        }
        Some(self.refetch())
    }

    pub fn reconnect(&mut self) -> Option<Call> {
        if !self.options.refetch_on_reconnect {
            return None;
        }
        Some(self.refetch())
    }

    /// Unconditionally start a list fetch.
    pub fn refetch(&mut self) -> Call {
        self.cache.begin_fetch(list_key());
        Call::GetTodos
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Submit the draft as a new todo. Empty drafts are not sent.
    pub fn submit(&mut self) -> Option<Call> {
        if self.draft.is_empty() {
            return None;
        }
        self.pending_adds += 1;
        Some(Call::AddTodo(std::mem::take(&mut self.draft)))
    }

    /// Flip the `done` flag of a listed todo.
    pub fn toggle(&self, id: i64) -> Option<Call> {
        let todo = self.todos().iter().find(|todo| todo.id == id)?;
        Some(Call::SetDone(SetDone {
            id,
            done: !todo.done,
        }))
    }

    /// Feed back the settled result of a call this list returned.
    pub fn settle(&mut self, call: &Call, result: Result<Reply, ApiError>) -> Option<Call> {
        match call.kind() {
            ProcedureKind::Query => {
                if let Some(key) = QueryKey::of(call) {
                    self.cache.settle_fetch(key, result.ok());
                }
                None
            }
            ProcedureKind::Mutation => {
                if matches!(call, Call::AddTodo(_)) {
                    self.pending_adds = self.pending_adds.saturating_sub(1);
                }
                self.cache.invalidate(Procedure::GetTodos.path());
                Some(self.refetch())
            }
        }
    }
}

fn list_key() -> QueryKey {
    QueryKey {
        path: Procedure::GetTodos.path(),
        input: None,
    }
}
