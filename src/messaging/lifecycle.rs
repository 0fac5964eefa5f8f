//! One-way lifecycle notifications: ready on mount, size on content changes.

use super::client::BusClient;
use super::types::ContentExtent;
use tracing::debug;

/// Tells the host when the UI mounts and when its content changes size.
///
/// Nothing here waits or fails; delivery problems are logged by the client.
pub struct LifecycleAnnouncer<'a> {
    client: &'a BusClient,
    mounted: bool,
    last_extent: Option<ContentExtent>,
}

impl<'a> LifecycleAnnouncer<'a> {
    pub fn new(client: &'a BusClient) -> Self {
        Self {
            client,
            mounted: false,
            last_extent: None,
        }
    }

    /// Announce readiness and the initial extents. Later calls only
    /// re-announce the size.
    pub fn mount(&mut self, extent: ContentExtent) {
        if self.mounted {
            debug!("Already mounted; announcing size only");
        } else {
            self.client.announce_ready();
            self.mounted = true;
        }
        self.announce(extent);
    }

    /// Announce new extents after a size-relevant content change.
    pub fn content_changed(&mut self, extent: ContentExtent) {
        self.announce(extent);
    }

    fn announce(&mut self, extent: ContentExtent) {
        self.client.announce_size(extent);
        self.last_extent = Some(extent);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Extents most recently sent to the host.
    pub fn last_extent(&self) -> Option<ContentExtent> {
        self.last_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::messaging::channel::MemoryChannel;
    use crate::messaging::types::OutboundMessage;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_mount_sends_ready_then_size() {
        let (channel, mut host) = MemoryChannel::pair();
        let client = BusClient::new(Arc::new(channel), BridgeConfig::default());
        let mut announcer = LifecycleAnnouncer::new(&client);

        announcer.mount(ContentExtent::new(640, 360));
        assert!(announcer.is_mounted());

        assert_eq!(host.try_next_posted(), Some(OutboundMessage::Ready));
        assert_eq!(
            host.try_next_posted(),
            Some(OutboundMessage::SizeChange {
                payload: ContentExtent::new(640, 360)
            })
        );
        assert!(host.try_next_posted().is_none());
    }

    #[tokio::test]
    async fn test_ready_is_sent_once() {
        let (channel, mut host) = MemoryChannel::pair();
        let client = BusClient::new(Arc::new(channel), BridgeConfig::default());
        let mut announcer = LifecycleAnnouncer::new(&client);

        announcer.mount(ContentExtent::new(1, 1));
        announcer.mount(ContentExtent::new(2, 2));

        let posted: Vec<_> = std::iter::from_fn(|| host.try_next_posted()).collect();
        let ready_count = posted
            .iter()
            .filter(|m| matches!(m, OutboundMessage::Ready))
            .count();
        assert_eq!(ready_count, 1);
        assert_eq!(posted.len(), 3);
    }

    #[tokio::test]
    async fn test_content_changed_sends_size_only() {
        let (channel, mut host) = MemoryChannel::pair();
        let client = BusClient::new(Arc::new(channel), BridgeConfig::default());
        let mut announcer = LifecycleAnnouncer::new(&client);

        announcer.content_changed(ContentExtent::new(900, 400));
        assert_eq!(
            host.try_next_posted(),
            Some(OutboundMessage::SizeChange {
                payload: ContentExtent::new(900, 400)
            })
        );
        assert_eq!(announcer.last_extent(), Some(ContentExtent::new(900, 400)));
    }

    #[test]
    fn test_without_host_nothing_fails() {
        let client = BusClient::new(Arc::new(MemoryChannel::detached()), BridgeConfig::default());
        let mut announcer = LifecycleAnnouncer::new(&client);
        announcer.mount(ContentExtent::new(1, 1));
        announcer.content_changed(ContentExtent::new(2, 2));
        assert!(announcer.is_mounted());
    }
}
