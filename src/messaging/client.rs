//! The bus client: the embedded UI's side of the host protocol.
//!
//! [`BusClient`] is the only owner of the host channel. It posts lifecycle
//! notifications and correlated requests, routes every inbound message to the
//! matching pending request, and records render-data pushes as soon as capture
//! starts so a waiter that shows up late still sees them.
//!
//! ## Request flow
//!
//! ```text
//!   send_request ──► register entry ──► post ──► select! { response | signal }
//!                                                    │            │
//!   dispatch(Response) ──► registry.resolve/reject ──┘            │
//!   timeout / caller abort ──► registry.cancel ◄──────────────────┘
//! ```
//!
//! Whichever side settles first removes the entry; the other finds nothing.

use super::bus::{BusError, MessageBus};
use super::channel::HostChannel;
use super::compat;
use super::error::{BridgeError, ChannelError};
use super::queue::EarlyArrivalQueue;
use super::registry::PendingRequests;
use super::signal::AbortSignal;
use super::types::{
    ContentExtent, CorrelationId, InboundMessage, OutboundMessage, RenderDataPayload, Request,
};
use crate::config::BridgeConfig;
use crate::schema::Schema;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// How long an operation may wait before timing out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum TimeoutSetting {
    /// Use the client's configured timeout.
    #[default]
    Configured,
    After(Duration),
    Disabled,
}

/// Per-call options for [`BusClient::send_request`] and
/// [`BusClient::wait_for_render_data`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    signal: Option<AbortSignal>,
    timeout: TimeoutSetting,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the call when `signal` fires.
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Override the configured timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = TimeoutSetting::After(timeout);
        self
    }

    /// Wait without a deadline; only the caller's signal can end the wait.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = TimeoutSetting::Disabled;
        self
    }

    /// Merge the caller's signal with the effective timeout.
    fn combined_signal(&self, configured: Duration) -> AbortSignal {
        let timeout = match self.timeout {
            TimeoutSetting::Configured => Some(configured),
            TimeoutSetting::After(duration) => Some(duration),
            TimeoutSetting::Disabled => None,
        };

        let sources = self
            .signal
            .iter()
            .cloned()
            .chain(timeout.map(AbortSignal::timeout));
        AbortSignal::any(sources)
    }
}

/// Removes a request's registry entry however its future ends.
struct PendingGuard<'a> {
    registry: &'a PendingRequests,
    id: CorrelationId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.registry.cancel(&self.id) {
            debug!(message_id = %self.id, "request dropped: removed pending entry");
        }
    }
}

/// Message bus client for a UI embedded in a host frame.
pub struct BusClient {
    channel: Arc<dyn HostChannel>,
    config: BridgeConfig,
    registry: PendingRequests,
    early_arrivals: EarlyArrivalQueue,
    bus: MessageBus,
    capturing: AtomicBool,
}

impl BusClient {
    /// Create a client without starting inbound capture.
    pub fn new(channel: Arc<dyn HostChannel>, config: BridgeConfig) -> Self {
        Self {
            bus: MessageBus::with_capacity(config.bus_capacity),
            channel,
            config,
            registry: PendingRequests::new(),
            early_arrivals: EarlyArrivalQueue::new(),
            capturing: AtomicBool::new(false),
        }
    }

    /// Create a client and start capturing inbound messages immediately.
    ///
    /// Fails if another client already captures the channel's inbound
    /// stream. Must be called from within a Tokio runtime.
    pub fn connect(
        channel: Arc<dyn HostChannel>,
        config: BridgeConfig,
    ) -> Result<Arc<Self>, BridgeError> {
        let client = Arc::new(Self::new(channel, config));
        client.start_capture()?;
        Ok(client)
    }

    /// Whether the channel reports an addressable host.
    pub fn has_host(&self) -> bool {
        self.channel.has_host()
    }

    /// Start routing the channel's inbound stream through [`dispatch`](Self::dispatch).
    ///
    /// Only the first call has an effect; returns whether this call started it.
    /// Fails with [`ChannelError::InboundTaken`] when another client owns the
    /// channel's inbound stream, as this client would never see a push.
    pub fn start_capture(self: &Arc<Self>) -> Result<bool, BridgeError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            debug!("Inbound capture already started");
            return Ok(false);
        }

        let Some(mut inbound) = self.channel.take_inbound() else {
            self.capturing.store(false, Ordering::SeqCst);
            warn!("Host channel inbound stream is captured by another client");
            return Err(ChannelError::InboundTaken.into());
        };

        let client = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                let Some(client) = client.upgrade() else {
                    break;
                };
                client.dispatch(message);
            }
            trace!("Inbound capture finished");
        });

        Ok(true)
    }

    /// Route one inbound message.
    ///
    /// Responses settle their pending request; render-data pushes are queued.
    /// Every message is then published to in-process listeners.
    pub fn dispatch(&self, message: InboundMessage) {
        match &message {
            InboundMessage::Response {
                message_id,
                payload,
            } => {
                let settled = match payload.clone().into_outcome() {
                    Ok(value) => self.registry.resolve(message_id, value),
                    Err(error) => self.registry.reject(message_id, BridgeError::Remote(error)),
                };
                trace!(message_id = %message_id, settled, "Routed response");
            }
            InboundMessage::RenderData { payload } => {
                self.early_arrivals.push(payload.clone());
                debug!(queued = self.early_arrivals.len(), "Captured render data push");
            }
            InboundMessage::Unknown => {
                trace!("Ignoring unrecognized host message");
            }
        }

        // No listeners is the common case.
        let _ = self.bus.sender().send(message);
    }

    /// Tell the host the UI surface has initialized. Never fails.
    pub fn announce_ready(&self) {
        self.post_lifecycle(&OutboundMessage::Ready);
    }

    /// Tell the host the current content extents. Never fails.
    pub fn announce_size(&self, extent: ContentExtent) {
        self.post_lifecycle(&OutboundMessage::SizeChange { payload: extent });
    }

    fn post_lifecycle(&self, message: &OutboundMessage) {
        if !self.channel.has_host() {
            trace!(?message, "No host frame; lifecycle message not sent");
            return;
        }
        if let Err(e) = self.channel.post(message) {
            debug!(error = %e, ?message, "Lifecycle message not delivered");
        }
    }

    /// Send a request and wait for the host's correlated response.
    ///
    /// Tool calls are rewritten to prompts before sending. Fails with
    /// [`BridgeError::NoHost`] or [`BridgeError::AlreadyAborted`] without
    /// posting anything.
    pub async fn send_request(
        &self,
        request: Request,
        options: RequestOptions,
    ) -> Result<Value, BridgeError> {
        if !self.channel.has_host() {
            return Err(BridgeError::NoHost);
        }

        let signal = options.combined_signal(self.config.request_timeout());
        if signal.is_aborted() {
            return Err(BridgeError::AlreadyAborted);
        }

        let requested = request.kind();
        let request = compat::adapt_for_host(request);
        let id = CorrelationId::new();

        let entry = self.registry.register(id.clone())?;
        let _guard = PendingGuard {
            registry: &self.registry,
            id: id.clone(),
        };

        self.channel
            .post(&OutboundMessage::request(id.clone(), request))?;
        debug!(message_id = %id, kind = %requested, "Request sent");

        tokio::select! {
            biased;
            settled = entry.settled() => settled,
            reason = signal.aborted() => {
                self.registry.cancel(&id);
                debug!(message_id = %id, ?reason, "Request aborted before a response arrived");
                Err(reason.into())
            }
        }
    }

    /// Send a request and validate the response against `schema`.
    pub async fn send_request_with_schema<S: Schema>(
        &self,
        request: Request,
        schema: &S,
        options: RequestOptions,
    ) -> Result<S::Output, BridgeError> {
        let raw = self.send_request(request, options).await?;
        Ok(schema.validate(raw)?)
    }

    /// Resolve with the host's initial render data, validated against `schema`.
    ///
    /// Uses a push that already arrived if there is one; otherwise waits for
    /// the next push until the timeout or the caller's signal fires.
    pub async fn wait_for_render_data<S: Schema>(
        &self,
        schema: &S,
        options: RequestOptions,
    ) -> Result<S::Output, BridgeError> {
        let signal = options.combined_signal(self.config.render_data_timeout());
        if let Some(reason) = signal.reason() {
            return Err(reason.into());
        }

        // Subscribe before looking at the queue so a push landing in between
        // is seen by one or the other.
        let mut listener = self.bus.subscribe();
        if let Some(queued) = self.early_arrivals.take_first() {
            debug!("Render data was already queued");
            return validate_render_data(schema, queued);
        }

        let mut aborted = signal.aborted();
        loop {
            tokio::select! {
                biased;
                received = listener.recv() => match received {
                    Ok(InboundMessage::RenderData { payload }) => {
                        // The queue, not the broadcast, decides which push is ours.
                        let Some(queued) = self.early_arrivals.take_first() else {
                            debug!("Render data push already taken by another waiter");
                            continue;
                        };
                        if queued != payload {
                            debug!("Took an earlier queued push than the one just received");
                        }
                        return validate_render_data(schema, queued);
                    }
                    Ok(_) => continue,
                    Err(BusError::Lagged(skipped)) => {
                        warn!(skipped, "Render data listener lagged");
                        if let Some(queued) = self.early_arrivals.take_first() {
                            return validate_render_data(schema, queued);
                        }
                    }
                    Err(BusError::Closed) => return Err(ChannelError::Closed.into()),
                },
                reason = &mut aborted => {
                    debug!(?reason, "Stopped waiting for render data");
                    return Err(reason.into());
                }
            }
        }
    }

    /// Number of requests awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.registry.len()
    }

    /// Number of render-data pushes not yet taken by a waiter.
    pub fn queued_render_data(&self) -> usize {
        self.early_arrivals.len()
    }
}

fn validate_render_data<S: Schema>(
    schema: &S,
    payload: RenderDataPayload,
) -> Result<S::Output, BridgeError> {
    Ok(schema.validate(payload.render_data)?)
}
