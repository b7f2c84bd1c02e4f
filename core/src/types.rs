//! Domain DTOs shared by the router, the callers, and the list component.
//!
//! # Design
//! The server and every client bind to these exact types, so a change here is
//! a contract change on both sides of the wire. Ids are storage-assigned
//! integers; `content` is immutable after creation and only `done` changes.

use serde::{Deserialize, Serialize};

/// A single todo record as stored and as returned by every procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub content: String,
    pub done: bool,
}

/// Input of the `setDone` procedure.
///
/// Unknown keys are ignored on decode, matching a permissive object validator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetDone {
    pub id: i64,
    pub done: bool,
}
