//! Request correlator (frame side).
//!
//! Maps in-flight ids to pending records:
//! - ids are allocated from a monotonic counter and never reused;
//! - each record arms its own deadline task at registration;
//! - whoever removes the record first (response or deadline) completes it,
//!   the loser finds nothing and does nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

use framebridge_core::error::{BridgeError, Result};

/// Outcome delivered to the waiting caller.
pub type CallOutcome = Result<Value>;

/// One in-flight call.
#[derive(Debug)]
pub struct PendingCall {
    pub method: String,
    resolver: oneshot::Sender<CallOutcome>,
    timer: Option<AbortHandle>,
}

impl PendingCall {
    /// Resume the caller and disarm the deadline.
    pub fn complete(self, outcome: CallOutcome) {
        if let Some(timer) = self.timer {
            timer.abort();
        }
        // Caller may have stopped waiting; nothing to do then.
        let _ = self.resolver.send(outcome);
    }
}

/// Receiving half handed to the caller.
#[derive(Debug)]
pub struct PendingReceiver {
    pub id: u64,
    rx: oneshot::Receiver<CallOutcome>,
}

impl PendingReceiver {
    pub async fn wait(self) -> CallOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| Err(BridgeError::Internal("pending call dropped".into())))
    }
}

#[derive(Debug)]
pub struct Correlator {
    next_id: AtomicU64,
    pending: Arc<DashMap<u64, PendingCall>>,
    timeout: Duration,
}

impl Correlator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Arc::new(DashMap::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Allocate an id and store its pending record. Must run inside a tokio runtime.
    pub fn register(&self, method: &str) -> PendingReceiver {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            id,
            PendingCall {
                method: method.to_string(),
                resolver: tx,
                timer: None,
            },
        );

        let pending = Arc::clone(&self.pending);
        let deadline = self.timeout;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            if let Some((_, call)) = pending.remove(&id) {
                tracing::warn!(id, method = %call.method, "bridge call timed out");
                let _ = call.resolver.send(Err(BridgeError::Timeout));
            }
        });

        // The record may already be gone if a response raced the spawn.
        if let Some(mut rec) = self.pending.get_mut(&id) {
            rec.timer = Some(timer.abort_handle());
        }

        tracing::debug!(id, method, pending = self.pending.len(), "registered pending call");
        PendingReceiver { id, rx }
    }

    /// Remove and return the record for `id`, if still pending.
    pub fn take(&self, id: u64) -> Option<PendingCall> {
        self.pending.remove(&id).map(|(_, call)| call)
    }

    /// Fail a record immediately (e.g. the post itself failed).
    pub fn fail(&self, id: u64, err: BridgeError) {
        if let Some(call) = self.take(id) {
            call.complete(Err(err));
        }
    }

    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pending ids in ascending order (diagnostics).
    pub fn pending_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.pending.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}
