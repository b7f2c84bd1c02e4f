//! Network host for the todo core.
//!
//! # Overview
//! Executes the requests `todo_core::TodoClient` builds, batching concurrent
//! calls into one exchange per procedure kind, and drives the list component
//! against any `TodoApi`.
//!
//! # Design
//! - `Transport` is the only place that performs I/O; `UreqTransport` is the
//!   blocking implementation and runs on tokio's blocking pool.
//! - `BatchLink` implements `TodoApi`, so the list controller works the same
//!   over the network as over the server's in-process caller.

pub mod controller;
pub mod link;
pub mod transport;

pub use controller::TodoListController;
pub use link::{BatchLink, LinkConfig};
pub use transport::{Transport, UreqTransport};
