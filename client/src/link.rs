//! Network implementation of `TodoApi` that batches concurrent calls.
//!
//! # Design
//! Callers push their call onto a channel and wait on a oneshot. A single
//! collector task takes the first pending call, yields once so every call
//! issued in the same tick can enqueue, then drains the channel. The drained
//! calls are split into one query batch and one mutation batch, and each
//! batch goes out as one HTTP exchange on the blocking pool. Results come
//! back in call order, so batching is invisible to callers.

use std::sync::Arc;

use async_trait::async_trait;
use todo_core::{ApiError, Call, ProcedureKind, Reply, TodoApi, TodoClient};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::transport::{Transport, UreqTransport};

pub const DEFAULT_MAX_BATCH_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Endpoint root, e.g. `http://localhost:3002/api/trpc`.
    pub url: String,
    /// Upper bound on calls per HTTP exchange.
    pub max_batch_size: usize,
}

impl LinkConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

struct Pending {
    call: Call,
    reply: oneshot::Sender<Result<Reply, ApiError>>,
}

/// Cloneable handle to a running collector task.
///
/// The collector stops once every handle is dropped. Must be created inside
/// a tokio runtime.
#[derive(Clone)]
pub struct BatchLink {
    sender: mpsc::UnboundedSender<Pending>,
}

impl BatchLink {
    pub fn new(config: LinkConfig) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(config: LinkConfig, transport: Arc<dyn Transport>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let client = TodoClient::new(&config.url);
        tokio::spawn(collect(receiver, client, transport, config.max_batch_size.max(1)));
        Self { sender }
    }
}

#[async_trait]
impl TodoApi for BatchLink {
    async fn call(&self, call: Call) -> Result<Reply, ApiError> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(Pending { call, reply })
            .map_err(|_| ApiError::Transport("batch link is closed".to_string()))?;
        receiver
            .await
            .map_err(|_| ApiError::Transport("batch dropped before replying".to_string()))?
    }
}

async fn collect(
    mut receiver: mpsc::UnboundedReceiver<Pending>,
    client: TodoClient,
    transport: Arc<dyn Transport>,
    max_batch_size: usize,
) {
    while let Some(first) = receiver.recv().await {
        let mut pending = vec![first];
        tokio::task::yield_now().await;
        while pending.len() < max_batch_size {
            match receiver.try_recv() {
                Ok(next) => pending.push(next),
                Err(_) => break,
            }
        }

        let (queries, mutations): (Vec<Pending>, Vec<Pending>) = pending
            .into_iter()
            .partition(|pending| pending.call.kind() == ProcedureKind::Query);
        for group in [queries, mutations] {
            if !group.is_empty() {
                tokio::spawn(send_batch(client.clone(), Arc::clone(&transport), group));
            }
        }
    }
    debug!("batch link closed");
}

async fn send_batch(client: TodoClient, transport: Arc<dyn Transport>, group: Vec<Pending>) {
    let calls: Vec<Call> = group.iter().map(|pending| pending.call.clone()).collect();
    debug!(size = calls.len(), "dispatching batch");

    match exchange(&client, transport, &calls).await {
        Ok(results) => {
            for (pending, result) in group.into_iter().zip(results) {
                let _ = pending.reply.send(result);
            }
        }
        Err(err) => {
            warn!(error = %err, size = calls.len(), "batch failed");
            for pending in group {
                let _ = pending.reply.send(Err(err.clone()));
            }
        }
    }
}

async fn exchange(
    client: &TodoClient,
    transport: Arc<dyn Transport>,
    calls: &[Call],
) -> Result<Vec<Result<Reply, ApiError>>, ApiError> {
    let request = client.build_batch(calls)?;
    let response = tokio::task::spawn_blocking(move || transport.execute(request))
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))??;
    client.parse_batch(calls, response)
}
