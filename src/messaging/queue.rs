//! Capture of render-data pushes that arrive before anyone asks for them.

use super::types::RenderDataPayload;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered record of render-data pushes received from the host.
///
/// Pushes are appended in arrival order. A waiter takes the earliest one;
/// later pushes stay queued until taken.
#[derive(Debug, Default)]
pub struct EarlyArrivalQueue {
    pushes: Mutex<VecDeque<RenderDataPayload>>,
}

impl EarlyArrivalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn pushes(&self) -> MutexGuard<'_, VecDeque<RenderDataPayload>> {
        self.pushes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, payload: RenderDataPayload) {
        self.pushes().push_back(payload);
    }

    /// Remove and return the earliest queued push.
    pub fn take_first(&self) -> Option<RenderDataPayload> {
        self.pushes().pop_front()
    }

    pub fn len(&self) -> usize {
        self.pushes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pushes().is_empty()
    }
}
