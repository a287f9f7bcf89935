//! The seam between the engines and the notification bus.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::debug;

use mentorlink_core::types::UserId;
use mentorlink_entity::request::RequestView;
use mentorlink_entity::session::SessionView;

/// A state transition worth telling the affected users about.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A request arrived for the recipient.
    NewRequest(RequestView),
    /// The recipient decided on a request.
    RequestUpdated(RequestView),
    /// A student asked a mentor for a session.
    SessionRequestReceived(SessionView),
    /// The mentor decided on a session.
    SessionStatusUpdated(SessionView),
    /// A session was marked completed.
    SessionCompleted(SessionView),
    /// A session was cancelled; the payload is the last-known snapshot.
    SessionCancelled(SessionView),
}

impl DomainEvent {
    /// Wire name of the event on the bus.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewRequest(_) => "newRequest",
            Self::RequestUpdated(_) => "requestUpdated",
            Self::SessionRequestReceived(_) => "session-request-received",
            Self::SessionStatusUpdated(_) => "session-status-updated",
            Self::SessionCompleted(_) => "session-completed",
            Self::SessionCancelled(_) => "session-cancelled",
        }
    }
}

/// Delivers domain events to users' private channels.
///
/// Delivery is best effort and at most once: publishing never fails the
/// command that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync + Debug + 'static {
    /// Deliver `event` to every live connection of each recipient.
    async fn publish(&self, recipients: &[UserId], event: DomainEvent);
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, recipients: &[UserId], event: DomainEvent) {
        debug!(
            event = event.name(),
            recipients = recipients.len(),
            "Dropping event, no bus attached"
        );
    }
}
