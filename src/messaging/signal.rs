//! Composable cancellation signals.
//!
//! An [`AbortSignal`] fires at most once and remembers why: an explicit
//! [`AbortController::abort`], or an elapsed deadline. [`AbortSignal::any`]
//! merges several signals into one that fires with the reason of whichever
//! input fired first. The first observed reason is latched and never changes.

use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Someone called [`AbortController::abort`].
    Cancelled,
    /// A deadline elapsed.
    Timeout,
}

/// Read side of a cancellation source. Cheap to clone.
#[derive(Clone)]
pub struct AbortSignal {
    inner: Arc<SignalInner>,
}

struct SignalInner {
    state: watch::Sender<Option<AbortReason>>,
    deadline: Option<Instant>,
    sources: Vec<AbortSignal>,
}

impl AbortSignal {
    fn build(deadline: Option<Instant>, sources: Vec<AbortSignal>) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                state: watch::Sender::new(None),
                deadline,
                sources,
            }),
        }
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        Self::build(None, Vec::new())
    }

    /// A signal that fires with [`AbortReason::Timeout`] once `duration` has elapsed.
    pub fn timeout(duration: Duration) -> Self {
        Self::build(Some(Instant::now() + duration), Vec::new())
    }

    /// A signal that fires as soon as any of `signals` fires, with its reason.
    ///
    /// With no inputs the result never fires.
    pub fn any(signals: impl IntoIterator<Item = AbortSignal>) -> Self {
        let signal = Self::build(None, signals.into_iter().collect());
        // Latch inputs that already fired.
        let _ = signal.reason();
        signal
    }

    /// The reason this signal fired, or `None` while it is still live.
    pub fn reason(&self) -> Option<AbortReason> {
        if let Some(reason) = *self.inner.state.borrow() {
            return Some(reason);
        }

        let observed = if self
            .inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            Some(AbortReason::Timeout)
        } else {
            self.inner.sources.iter().find_map(AbortSignal::reason)
        };

        observed.map(|reason| self.latch(reason))
    }

    pub fn is_aborted(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolves with the reason once the signal fires.
    ///
    /// Resolves immediately if it already fired. Dropping the future is the
    /// only cleanup needed.
    pub fn aborted(&self) -> BoxFuture<'static, AbortReason> {
        let signal = self.clone();
        async move {
            if let Some(reason) = signal.reason() {
                return reason;
            }

            let mut state = signal.inner.state.subscribe();
            let mut waiters: Vec<BoxFuture<'static, AbortReason>> = Vec::new();

            waiters.push(
                async move {
                    let fired = match state.wait_for(Option::is_some).await {
                        Ok(reason) => *reason,
                        Err(_) => None,
                    };
                    match fired {
                        Some(reason) => reason,
                        None => future::pending().await,
                    }
                }
                .boxed(),
            );

            if let Some(deadline) = signal.inner.deadline {
                waiters.push(
                    tokio::time::sleep_until(deadline)
                        .map(|_| AbortReason::Timeout)
                        .boxed(),
                );
            }

            for source in &signal.inner.sources {
                waiters.push(source.aborted());
            }

            let (reason, _, _) = future::select_all(waiters).await;
            signal.latch(reason)
        }
        .boxed()
    }

    /// Record `reason` unless a reason is already latched; returns the latched one.
    fn latch(&self, reason: AbortReason) -> AbortReason {
        self.inner.state.send_if_modified(|state| {
            if state.is_none() {
                *state = Some(reason);
                true
            } else {
                false
            }
        });
        (*self.inner.state.borrow()).unwrap_or(reason)
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::never()
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("reason", &*self.inner.state.borrow())
            .field("deadline", &self.inner.deadline)
            .field("sources", &self.inner.sources.len())
            .finish()
    }
}

/// Write side of a cancellation source.
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The signal observers should watch.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fire the signal with [`AbortReason::Cancelled`]. Repeated calls are no-ops.
    pub fn abort(&self) {
        self.signal.latch(AbortReason::Cancelled);
    }

    pub fn is_aborted(&self) -> bool {
        self.signal.is_aborted()
    }
}
