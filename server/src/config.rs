use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use crate::store::{MemoryStore, SqliteStore, TodoStore};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "todo-server — todo list procedures over HTTP", long_about = None)]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "TODO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3002)]
    pub port: u16,

    /// Path to SQLite DB file (in-memory store when omitted)
    #[arg(long, env = "TODO_DATABASE")]
    pub database: Option<PathBuf>,

    /// Tracing filter, e.g. `info` or `todo_server=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

impl Config {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn open_store(&self) -> Result<Arc<dyn TodoStore>> {
        Ok(match self.database.as_ref() {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        })
    }
}
