//! Broadcast of inbound host messages to in-process listeners.
//!
//! This is the client's stand-in for the page's `message` event: every message
//! the host delivers is published here, and a listener is a subscription that
//! ends when its receiver is dropped.

use super::InboundMessage;
use tokio::sync::broadcast;

/// Default number of messages a slow listener may fall behind.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Sender half of the message bus.
#[derive(Clone)]
pub struct MessageSender {
    tx: broadcast::Sender<InboundMessage>,
}

impl MessageSender {
    /// Publish a message. Fails with [`BusError::Closed`] when nobody listens.
    pub fn send(&self, message: InboundMessage) -> Result<(), BusError> {
        self.tx.send(message).map_err(|_| BusError::Closed)?;
        Ok(())
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiver half of the message bus.
pub struct MessageReceiver {
    rx: broadcast::Receiver<InboundMessage>,
}

impl MessageReceiver {
    /// Receive the next message.
    pub async fn recv(&mut self) -> Result<InboundMessage, BusError> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => BusError::Closed,
            broadcast::error::RecvError::Lagged(n) => BusError::Lagged(n),
        })
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Result<Option<InboundMessage>, BusError> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(BusError::Closed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Err(BusError::Lagged(n)),
        }
    }
}

/// Message bus carrying host messages to listeners.
pub struct MessageBus {
    tx: broadcast::Sender<InboundMessage>,
}

impl MessageBus {
    /// Create a new message bus.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Create a bus that buffers up to `capacity` messages per listener.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Get a sender.
    pub fn sender(&self) -> MessageSender {
        MessageSender {
            tx: self.tx.clone(),
        }
    }

    /// Subscribe to messages published from now on.
    pub fn subscribe(&self) -> MessageReceiver {
        MessageReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus errors.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Channel closed")]
    Closed,
    #[error("Lagged behind by {0} messages")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::CorrelationId;
    use serde_json::json;

    // =========================================================================
    // MessageBus Tests
    // =========================================================================

    #[test]
    fn test_multiple_subscribers() {
        let bus = MessageBus::new();
        let sender = bus.sender();

        let mut receiver1 = bus.subscribe();
        let mut receiver2 = bus.subscribe();

        sender.send(InboundMessage::render_data(json!({}))).unwrap();

        assert!(receiver1.try_recv().unwrap().is_some());
        assert!(receiver2.try_recv().unwrap().is_some());
    }

    #[test]
    fn test_subscriber_sees_only_later_messages() {
        let bus = MessageBus::new();
        let sender = bus.sender();
        let _early = bus.subscribe();

        sender.send(InboundMessage::Unknown).unwrap();
        let mut late = bus.subscribe();

        assert!(late.try_recv().unwrap().is_none());
    }

    #[test]
    fn test_dropping_receiver_removes_listener() {
        let bus = MessageBus::new();
        let sender = bus.sender();

        let receiver = bus.subscribe();
        assert_eq!(sender.listener_count(), 1);
        drop(receiver);
        assert_eq!(sender.listener_count(), 0);
    }

    // =========================================================================
    // MessageSender Tests
    // =========================================================================

    #[test]
    fn test_sender_send_without_listeners() {
        let bus = MessageBus::new();
        let sender = bus.sender();

        // Broadcast channels return an error if no receivers exist
        let result = sender.send(InboundMessage::Unknown);
        assert!(matches!(result, Err(BusError::Closed)));
    }

    // =========================================================================
    // MessageReceiver Tests
    // =========================================================================

    #[test]
    fn test_receiver_try_recv_empty() {
        let bus = MessageBus::new();
        let mut receiver = bus.subscribe();

        let result = receiver.try_recv();
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_receiver_recv_closed() {
        let bus = MessageBus::new();
        let mut receiver = bus.subscribe();

        drop(bus);

        let result = receiver.recv().await;
        assert!(matches!(result, Err(BusError::Closed)));
    }

    #[test]
    fn test_try_recv_lagged() {
        let bus = MessageBus::with_capacity(2);
        let sender = bus.sender();
        let mut receiver = bus.subscribe();

        for i in 0..5 {
            let _ = sender.send(InboundMessage::response(CorrelationId::new(), json!(i)));
        }

        match receiver.try_recv() {
            Err(BusError::Lagged(n)) => assert_eq!(n, 3),
            other => panic!("expected lag, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_messages_arrive_in_send_order() {
        let bus = MessageBus::new();
        let sender = bus.sender();
        let mut receiver = bus.subscribe();

        sender.send(InboundMessage::render_data(json!(1))).unwrap();
        sender.send(InboundMessage::render_data(json!(2))).unwrap();

        assert_eq!(
            receiver.recv().await.unwrap(),
            InboundMessage::render_data(json!(1))
        );
        assert_eq!(
            receiver.recv().await.unwrap(),
            InboundMessage::render_data(json!(2))
        );
    }

    // =========================================================================
    // BusError Tests
    // =========================================================================

    #[test]
    fn test_bus_error_display() {
        assert_eq!(BusError::Closed.to_string(), "Channel closed");
        assert_eq!(BusError::Lagged(42).to_string(), "Lagged behind by 42 messages");
    }
}
