//! I/O-free contract for the todo RPC service.
//!
//! # Overview
//! Describes the three procedures (`todo.getTodos`, `todo.addTodo`,
//! `todo.setDone`), their wire envelopes, and a client that builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network (host-does-IO pattern). The list component lives here too, as a
//! state machine that emits calls instead of running them.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only the endpoint base URL.
//! - Every call is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), for single calls and for batches.
//! - `TodoApi` is the calling contract. The server's in-process caller and
//!   the network batch link both implement it, so the list component runs
//!   against either.

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod list;
pub mod procedure;
pub mod query;
pub mod types;
pub mod wire;

pub use api::TodoApi;
pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::{Phase, TodoList};
pub use procedure::{Call, Procedure, ProcedureKind, Reply};
pub use query::{QueryCache, QueryKey, QueryOptions};
pub use types::{SetDone, Todo};
pub use wire::{Envelope, ErrorCode, ErrorShape};
