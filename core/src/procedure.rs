//! The procedure table: names, kinds, typed calls and typed replies.

use std::fmt;

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::types::{SetDone, Todo};

/// Read-only procedures are queries; everything that writes is a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureKind {
    Query,
    Mutation,
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureKind::Query => write!(f, "query"),
            ProcedureKind::Mutation => write!(f, "mutation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    GetTodos,
    AddTodo,
    SetDone,
}

impl Procedure {
    pub const ALL: [Procedure; 3] = [Procedure::GetTodos, Procedure::AddTodo, Procedure::SetDone];

    /// Wire path, namespaced under `todo`.
    pub fn path(self) -> &'static str {
        match self {
            Procedure::GetTodos => "todo.getTodos",
            Procedure::AddTodo => "todo.addTodo",
            Procedure::SetDone => "todo.setDone",
        }
    }

    pub fn kind(self) -> ProcedureKind {
        match self {
            Procedure::GetTodos => ProcedureKind::Query,
            Procedure::AddTodo | Procedure::SetDone => ProcedureKind::Mutation,
        }
    }

    pub fn from_path(path: &str) -> Option<Procedure> {
        Self::ALL.into_iter().find(|procedure| procedure.path() == path)
    }
}

/// A procedure invocation with its typed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetTodos,
    AddTodo(String),
    SetDone(SetDone),
}

impl Call {
    pub fn procedure(&self) -> Procedure {
        match self {
            Call::GetTodos => Procedure::GetTodos,
            Call::AddTodo(_) => Procedure::AddTodo,
            Call::SetDone(_) => Procedure::SetDone,
        }
    }

    pub fn kind(&self) -> ProcedureKind {
        self.procedure().kind()
    }

    /// JSON input as sent on the wire; `None` for procedures without input.
    pub fn input(&self) -> Option<Value> {
        match self {
            Call::GetTodos => None,
            Call::AddTodo(content) => Some(Value::String(content.clone())),
            Call::SetDone(input) => Some(json!({ "id": input.id, "done": input.done })),
        }
    }

    /// Decode the `data` of a success envelope into this call's reply type.
    pub fn decode_output(&self, data: Value) -> Result<Reply, ApiError> {
        let decoded = match self {
            Call::GetTodos => serde_json::from_value(data).map(Reply::Todos),
            Call::AddTodo(_) | Call::SetDone(_) => serde_json::from_value(data).map(Reply::Todo),
        };
        decoded.map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Typed output of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Todos(Vec<Todo>),
    Todo(Todo),
}

impl Reply {
    pub fn as_todos(&self) -> Option<&[Todo]> {
        match self {
            Reply::Todos(todos) => Some(todos),
            Reply::Todo(_) => None,
        }
    }

    pub fn into_todos(self) -> Result<Vec<Todo>, ApiError> {
        match self {
            Reply::Todos(todos) => Ok(todos),
            Reply::Todo(_) => Err(ApiError::DeserializationError(
                "expected a todo list, got a single todo".to_string(),
            )),
        }
    }

    pub fn into_todo(self) -> Result<Todo, ApiError> {
        match self {
            Reply::Todo(todo) => Ok(todo),
            Reply::Todos(_) => Err(ApiError::DeserializationError(
                "expected a single todo, got a todo list".to_string(),
            )),
        }
    }
}
