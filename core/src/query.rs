//! Server-state cache for query results.
//!
//! Entries are keyed by procedure path plus serialized input, so two calls of
//! the same query with different arguments never share data. Mutations do not
//! write to the cache; they mark entries stale and the owner refetches.

use std::collections::HashMap;

use crate::procedure::{Call, ProcedureKind, Reply};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub path: &'static str,
    pub input: Option<String>,
}

impl QueryKey {
    /// Key for a query call; mutations have no key.
    pub fn of(call: &Call) -> Option<QueryKey> {
        if call.kind() != ProcedureKind::Query {
            return None;
        }
        Some(QueryKey {
            path: call.procedure().path(),
            input: call.input().map(|value| value.to_string()),
        })
    }
}

/// Refetch policy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub refetch_on_mount: bool,
    pub refetch_on_reconnect: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            refetch_on_mount: true,
            refetch_on_reconnect: true,
        }
    }
}

impl QueryOptions {
    /// Policy for data already fetched while rendering on the server.
    pub fn prefetched() -> Self {
        Self {
            refetch_on_mount: false,
            refetch_on_reconnect: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct QueryEntry {
    data: Option<Reply>,
    stale: bool,
    in_flight: usize,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, QueryEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&Reply> {
        self.entries.get(key).and_then(|entry| entry.data.as_ref())
    }

    /// Store data without a fetch, e.g. from a server-side prefetch.
    pub fn seed(&mut self, key: QueryKey, data: Reply) {
        let entry = self.entries.entry(key).or_default();
        entry.data = Some(data);
        entry.stale = false;
    }

    pub fn begin_fetch(&mut self, key: QueryKey) {
        self.entries.entry(key).or_default().in_flight += 1;
    }

    /// Record a settled fetch. Failures keep the previous data; the last
    /// successful settlement wins.
    pub fn settle_fetch(&mut self, key: QueryKey, data: Option<Reply>) {
        let entry = self.entries.entry(key).or_default();
        entry.in_flight = entry.in_flight.saturating_sub(1);
        if let Some(data) = data {
            entry.data = Some(data);
            entry.stale = false;
        }
    }

    /// Mark every entry of a procedure path stale.
    pub fn invalidate(&mut self, path: &str) {
        for (key, entry) in self.entries.iter_mut() {
            if key.path == path {
                entry.stale = true;
            }
        }
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries.get(key).map_or(true, |entry| entry.stale || entry.data.is_none())
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.in_flight > 0)
    }
}
