use todo_core::{ErrorCode, ErrorShape, ProcedureKind};

use crate::store::StoreError;

/// Why a procedure call did not produce output.
#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    #[error("No \"{kind}\"-procedure on path \"{path}\"")]
    UnknownProcedure { kind: ProcedureKind, path: String },

    #[error("\"{path}\" is a {actual}, it cannot be called as a {requested}")]
    WrongKind {
        path: String,
        requested: ProcedureKind,
        actual: ProcedureKind,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl ProcedureError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ProcedureError::UnknownProcedure { .. } => ErrorCode::NotFound,
            ProcedureError::WrongKind { .. } => ErrorCode::MethodNotSupported,
            ProcedureError::InvalidInput(_) => ErrorCode::BadRequest,
            ProcedureError::Store(StoreError::NotFound(_)) => ErrorCode::NotFound,
            ProcedureError::Store(_) | ProcedureError::Output(_) => ErrorCode::InternalServerError,
        }
    }

    pub fn to_shape(&self, path: &str) -> ErrorShape {
        ErrorShape::new(self.code(), self.to_string(), Some(path))
    }
}
