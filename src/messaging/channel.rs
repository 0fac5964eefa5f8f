//! The transport between the embedded UI and its host.
//!
//! A [`HostChannel`] posts outbound messages and hands over a stream of
//! inbound ones exactly once. [`MemoryChannel`] keeps both directions in
//! process, with a [`MemoryHost`] playing the host's side.

use super::error::ChannelError;
use super::types::{CorrelationId, InboundMessage, OutboundMessage};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

/// Inbound half of a channel, as handed to the bus client.
pub type InboundStream = mpsc::UnboundedReceiver<InboundMessage>;

/// A cross-boundary message channel to the host frame.
pub trait HostChannel: Send + Sync {
    /// Whether there is an addressable host on the other side.
    fn has_host(&self) -> bool;

    /// Post one message to the host. Delivery is not confirmed.
    fn post(&self, message: &OutboundMessage) -> Result<(), ChannelError>;

    /// Take the inbound stream. Returns `None` once it has been taken.
    fn take_inbound(&self) -> Option<InboundStream>;
}

/// In-process channel connected to a [`MemoryHost`].
pub struct MemoryChannel {
    attached: bool,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    inbound: Mutex<Option<InboundStream>>,
}

impl MemoryChannel {
    /// A channel and the host end it talks to.
    pub fn pair() -> (Self, MemoryHost) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let channel = Self {
            attached: true,
            outbound: out_tx,
            inbound: Mutex::new(Some(in_rx)),
        };
        let host = MemoryHost {
            outbound: out_rx,
            inbound: in_tx,
        };
        (channel, host)
    }

    /// A channel with no host, as when the UI runs top-level.
    pub fn detached() -> Self {
        let (channel, _host) = Self::pair();
        Self {
            attached: false,
            ..channel
        }
    }
}

impl HostChannel for MemoryChannel {
    fn has_host(&self) -> bool {
        self.attached
    }

    fn post(&self, message: &OutboundMessage) -> Result<(), ChannelError> {
        self.outbound
            .send(message.clone())
            .map_err(|_| ChannelError::Closed)
    }

    fn take_inbound(&self) -> Option<InboundStream> {
        self.inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// The host's end of a [`MemoryChannel`].
pub struct MemoryHost {
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    inbound: mpsc::UnboundedSender<InboundMessage>,
}

impl MemoryHost {
    /// Deliver a message to the UI.
    pub fn deliver(&self, message: InboundMessage) -> Result<(), ChannelError> {
        self.inbound.send(message).map_err(|_| ChannelError::Closed)
    }

    /// Answer a request with a result.
    pub fn respond(&self, message_id: CorrelationId, response: Value) -> Result<(), ChannelError> {
        self.deliver(InboundMessage::response(message_id, response))
    }

    /// Answer a request with an error.
    pub fn respond_error(
        &self,
        message_id: CorrelationId,
        error: impl Into<String>,
    ) -> Result<(), ChannelError> {
        self.deliver(InboundMessage::error_response(message_id, error))
    }

    /// Push initial render data.
    pub fn push_render_data(&self, render_data: Value) -> Result<(), ChannelError> {
        self.deliver(InboundMessage::render_data(render_data))
    }

    /// Wait for the next message the UI posted.
    pub async fn next_posted(&mut self) -> Option<OutboundMessage> {
        self.outbound.recv().await
    }

    /// The next posted message, if one is already waiting.
    pub fn try_next_posted(&mut self) -> Option<OutboundMessage> {
        self.outbound.try_recv().ok()
    }
}
