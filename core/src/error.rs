//! Error types for the todo RPC client side.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the todo does not exist" from every other procedure failure. Other errors
//! reported by the server through an error envelope land in `Procedure` with
//! their wire code. Responses that are not envelopes at all land in
//! `HttpError` with the raw status and body for debugging.
//!
//! The type is `Clone` so a batch-wide failure can be handed to every call in
//! the batch.

use crate::wire::{ErrorCode, ErrorShape};

/// Errors returned by `TodoClient` parse methods and `TodoApi` callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The server reported `NOT_FOUND`: unknown todo id or unknown procedure.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server reported any other procedure error.
    #[error("{code:?}: {message}")]
    Procedure { code: ErrorCode, message: String },

    /// The server answered with something other than an envelope.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The calls cannot be sent together in one batch.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// The host failed to execute the HTTP exchange.
    #[error("transport failed: {0}")]
    Transport(String),
}

impl ApiError {
    /// Wire code for errors that came from the server, `None` otherwise.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ApiError::NotFound(_) => Some(ErrorCode::NotFound),
            ApiError::Procedure { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ErrorShape> for ApiError {
    fn from(shape: ErrorShape) -> Self {
        match shape.data.code {
            ErrorCode::NotFound => ApiError::NotFound(shape.message),
            code => ApiError::Procedure {
                code,
                message: shape.message,
            },
        }
    }
}
