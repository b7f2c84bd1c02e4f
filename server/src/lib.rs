//! Todo procedures served over HTTP.
//!
//! # Overview
//! `TodoRouter` owns the business rules and talks to a `TodoStore`.
//! `endpoint` exposes the router at `/api/trpc` with request batching;
//! `ServerCaller` exposes it in-process under the same contract.

pub mod caller;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod router;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

pub use caller::ServerCaller;
pub use config::Config;
pub use error::ProcedureError;
pub use router::TodoRouter;
pub use store::{MemoryStore, SqliteStore, StoreError, TodoStore};

/// Application over a fresh in-memory store.
pub fn app() -> Router {
    endpoint::routes(TodoRouter::in_memory())
}

pub fn app_with_store(store: Arc<dyn TodoStore>) -> Router {
    endpoint::routes(TodoRouter::new(store))
}

pub async fn run(listener: TcpListener, router: TodoRouter) -> Result<(), std::io::Error> {
    axum::serve(listener, endpoint::routes(router)).await
}
