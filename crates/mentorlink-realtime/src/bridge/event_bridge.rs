//! Domain event → private channel delivery.
//!
//! Bridges events from the coordination engines to the recipients'
//! private channels. Offline recipients simply miss the event.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use mentorlink_core::types::UserId;
use mentorlink_service::{DomainEvent, EventPublisher};

use crate::connection::manager::ConnectionManager;
use crate::message::types::OutboundEvent;

/// Bridges domain events into the realtime system.
#[derive(Debug, Clone)]
pub struct EventBridge {
    connections: Arc<ConnectionManager>,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl EventPublisher for EventBridge {
    async fn publish(&self, recipients: &[UserId], event: DomainEvent) {
        let event = OutboundEvent::from(event);
        let mut delivered = 0;
        for recipient in recipients {
            delivered += self.connections.send_to_user(*recipient, &event);
        }
        debug!(
            event = event.name(),
            recipients = recipients.len(),
            delivered,
            "Domain event published"
        );
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use mentorlink_core::config::{ConversationConfig, RealtimeConfig};
    use mentorlink_database::Stores;
    use mentorlink_database::memory::MemoryDirectory;
    use mentorlink_entity::request::{ConnectionRequest, RequestView};
    use mentorlink_entity::user::UserRole;
    use mentorlink_service::{ConversationService, DisplayResolver};

    use crate::connection::Frame;
    use crate::metrics::EngineMetrics;
    use crate::presence::PresenceTracker;

    fn manager() -> Arc<ConnectionManager> {
        let stores = Stores::memory(Arc::new(MemoryDirectory::new()));
        let conversations = ConversationService::new(
            stores.messages.clone(),
            DisplayResolver::new(stores.directory.clone()),
            ConversationConfig::default(),
        );
        Arc::new(ConnectionManager::new(
            RealtimeConfig::default(),
            Arc::new(PresenceTracker::new()),
            Arc::new(EngineMetrics::new()),
            Arc::new(conversations),
        ))
    }

    fn texts(rx: &mut mpsc::Receiver<Frame>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(Frame::Text(text)) = rx.try_recv() {
            out.push(text);
        }
        out
    }

    #[tokio::test]
    async fn test_event_reaches_only_recipients() {
        let connections = manager();
        let bridge = EventBridge::new(connections.clone());
        let (from, to) = (UserId::new(), UserId::new());

        let (_a, mut rx_from) = connections.register(from, UserRole::Mentee, "Mia".into());
        let (_b, mut rx_to) = connections.register(to, UserRole::Mentor, "Omar".into());
        texts(&mut rx_from);
        texts(&mut rx_to);

        let view = RequestView {
            request: ConnectionRequest::pending(from, to),
            from: None,
            to: None,
        };
        bridge
            .publish(&[to], DomainEvent::NewRequest(view.clone()))
            .await;

        assert!(texts(&mut rx_from).is_empty());
        let received = texts(&mut rx_to);
        assert_eq!(received.len(), 1);
        let event: OutboundEvent = serde_json::from_str(&received[0]).unwrap();
        assert_eq!(event, OutboundEvent::NewRequest(view));
    }
}
