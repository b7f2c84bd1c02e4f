//! The three todo procedures and their input validation.
//!
//! # Design
//! `TodoRouter` is the only place with business rules. Typed methods
//! (`get_todos`, `add_todo`, `set_done`) take already-validated input;
//! `dispatch` is the untyped entry used by both the HTTP endpoint and the
//! in-process caller, so validation and error mapping are shared by every
//! path into the router.

use std::sync::Arc;

use serde_json::Value;
use todo_core::{Envelope, Procedure, ProcedureKind, SetDone, Todo};
use tracing::{debug, warn};

use crate::error::ProcedureError;
use crate::store::{MemoryStore, NewTodo, TodoPatch, TodoStore};

#[derive(Clone)]
pub struct TodoRouter {
    store: Arc<dyn TodoStore>,
}

impl TodoRouter {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn get_todos(&self) -> Result<Vec<Todo>, ProcedureError> {
        Ok(self.store.find_many().await?)
    }

    /// Content is not checked for emptiness here; only the list component
    /// refuses empty drafts.
    pub async fn add_todo(&self, content: String) -> Result<Todo, ProcedureError> {
        Ok(self
            .store
            .create(NewTodo {
                content,
                done: false,
            })
            .await?)
    }

    pub async fn set_done(&self, input: SetDone) -> Result<Todo, ProcedureError> {
        Ok(self
            .store
            .update(input.id, TodoPatch { done: input.done })
            .await?)
    }

    /// Resolve `path`, validate `input`, and run the procedure.
    #[tracing::instrument(level = "debug", skip(self, input))]
    pub async fn dispatch(
        &self,
        kind: ProcedureKind,
        path: &str,
        input: Option<Value>,
    ) -> Result<Value, ProcedureError> {
        let procedure = Procedure::from_path(path).ok_or_else(|| ProcedureError::UnknownProcedure {
            kind,
            path: path.to_string(),
        })?;
        if procedure.kind() != kind {
            return Err(ProcedureError::WrongKind {
                path: path.to_string(),
                requested: kind,
                actual: procedure.kind(),
            });
        }

        let output = match procedure {
            Procedure::GetTodos => serde_json::to_value(self.get_todos().await?)?,
            Procedure::AddTodo => {
                let content: String = parse_input(input)?;
                serde_json::to_value(self.add_todo(content).await?)?
            }
            Procedure::SetDone => {
                let input: SetDone = parse_input(input)?;
                serde_json::to_value(self.set_done(input).await?)?
            }
        };
        Ok(output)
    }

    /// `dispatch`, folded into a wire envelope.
    pub async fn respond(&self, kind: ProcedureKind, path: &str, input: Option<Value>) -> Envelope {
        match self.dispatch(kind, path, input).await {
            Ok(data) => {
                debug!(path, "procedure succeeded");
                Envelope::Success { data }
            }
            Err(err) => {
                warn!(path, code = ?err.code(), error = %err, "procedure failed");
                Envelope::Failure(err.to_shape(path))
            }
        }
    }
}

fn parse_input<T: serde::de::DeserializeOwned>(input: Option<Value>) -> Result<T, ProcedureError> {
    serde_json::from_value(input.unwrap_or(Value::Null))
        .map_err(|e| ProcedureError::InvalidInput(e.to_string()))
}
