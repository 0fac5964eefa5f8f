//! In-flight request bookkeeping.
//!
//! Each outbound request owns one entry keyed by its correlation ID. An entry
//! is removed in the same step that settles it, so a late or duplicate
//! response finds nothing and is dropped.

use super::error::BridgeError;
use super::types::CorrelationId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Terminal outcome delivered to a waiting request.
pub type Settlement = Result<Value, BridgeError>;

/// Receiving half of a registered request.
#[derive(Debug)]
pub struct PendingEntry {
    id: CorrelationId,
    receiver: oneshot::Receiver<Settlement>,
}

impl PendingEntry {
    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    /// Wait for the entry to be resolved or rejected.
    ///
    /// An entry cancelled through the registry settles as
    /// [`BridgeError::Cancelled`].
    pub async fn settled(self) -> Settlement {
        self.receiver.await.unwrap_or(Err(BridgeError::Cancelled))
    }
}

/// Registry of requests awaiting a response.
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: Mutex<HashMap<CorrelationId, oneshot::Sender<Settlement>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CorrelationId, oneshot::Sender<Settlement>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create an entry for `id`. Fails if one is already pending.
    pub fn register(&self, id: CorrelationId) -> Result<PendingEntry, BridgeError> {
        let mut entries = self.entries();
        if entries.contains_key(&id) {
            return Err(BridgeError::DuplicateCorrelation(id));
        }

        let (tx, rx) = oneshot::channel();
        entries.insert(id.clone(), tx);
        trace!(message_id = %id, pending = entries.len(), "registered pending request");

        Ok(PendingEntry { id, receiver: rx })
    }

    /// Settle `id` with a value. Returns false if nothing was pending.
    pub fn resolve(&self, id: &CorrelationId, value: Value) -> bool {
        self.settle(id, Ok(value))
    }

    /// Settle `id` with an error. Returns false if nothing was pending.
    pub fn reject(&self, id: &CorrelationId, error: BridgeError) -> bool {
        self.settle(id, Err(error))
    }

    /// Drop the entry for `id` without settling it.
    pub fn cancel(&self, id: &CorrelationId) -> bool {
        let removed = self.entries().remove(id).is_some();
        if removed {
            trace!(message_id = %id, "cancelled pending request");
        }
        removed
    }

    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.entries().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn settle(&self, id: &CorrelationId, settlement: Settlement) -> bool {
        let Some(tx) = self.entries().remove(id) else {
            debug!(message_id = %id, "no pending request for response; ignoring");
            return false;
        };

        // The requester may have stopped listening; the entry is gone either way.
        if tx.send(settlement).is_err() {
            trace!(message_id = %id, "requester dropped before settlement");
        }
        true
    }
}
