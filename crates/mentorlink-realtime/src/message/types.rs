//! Inbound and outbound bus event definitions.
//!
//! Both directions share the envelope `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use mentorlink_core::error::AppError;
use mentorlink_core::types::{RoomKey, UserId};
use mentorlink_entity::message::MessageView;
use mentorlink_entity::request::RequestView;
use mentorlink_entity::session::SessionView;
use mentorlink_service::DomainEvent;

use crate::presence::status::PresenceStatus;

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    /// Legacy private-channel join. Only the caller's own id is accepted.
    #[serde(rename = "join")]
    Join(JoinPayload),
    /// Join a two-party chat room.
    #[serde(rename = "join_chat")]
    JoinChat(RoomPayload),
    /// Leave a chat room.
    #[serde(rename = "leave_chat")]
    LeaveChat(RoomPayload),
    /// Typing state change, relayed to the rest of the room.
    #[serde(rename = "typing_indicator")]
    TypingIndicator(TypingIndicator),
    /// Persist a message and relay it to the room.
    #[serde(rename = "send_message")]
    SendMessage(SendMessagePayload),
}

impl InboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::JoinChat(_) => "join_chat",
            Self::LeaveChat(_) => "leave_chat",
            Self::TypingIndicator(_) => "typing_indicator",
            Self::SendMessage(_) => "send_message",
        }
    }
}

/// Payload of `join`.
///
/// Older clients send the bare user id as `data`; both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "JoinShape")]
pub struct JoinPayload {
    /// The user whose private channel to join.
    pub user_id: UserId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JoinShape {
    Bare(UserId),
    #[serde(rename_all = "camelCase")]
    Object { user_id: UserId },
}

impl From<JoinShape> for JoinPayload {
    fn from(shape: JoinShape) -> Self {
        match shape {
            JoinShape::Bare(user_id) | JoinShape::Object { user_id } => Self { user_id },
        }
    }
}

/// Payload of `join_chat` and `leave_chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    /// Room key; validated on deserialization.
    pub room_id: RoomKey,
}

/// Payload of `typing_indicator`, identical in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    /// Room the typist is in.
    pub room_id: RoomKey,
    /// The typist.
    pub user_id: UserId,
    /// Whether typing started or stopped.
    pub is_typing: bool,
}

/// Payload of `send_message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    /// Author; must be the caller.
    pub sender: UserId,
    /// Addressee.
    pub recipient: UserId,
    /// Message body.
    pub content: String,
    /// Must equal the room of `sender` and `recipient`.
    pub room_id: RoomKey,
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    /// A connection request arrived.
    #[serde(rename = "newRequest")]
    NewRequest(RequestView),
    /// A sent request was accepted or rejected.
    #[serde(rename = "requestUpdated")]
    RequestUpdated(RequestView),
    /// A student asked for a session.
    #[serde(rename = "session-request-received")]
    SessionRequestReceived(SessionView),
    /// The mentor decided on a session.
    #[serde(rename = "session-status-updated")]
    SessionStatusUpdated(SessionView),
    /// A session was completed.
    #[serde(rename = "session-completed")]
    SessionCompleted(SessionView),
    /// A session was cancelled.
    #[serde(rename = "session-cancelled")]
    SessionCancelled(SessionView),
    /// A chat message was posted to a room the connection joined.
    #[serde(rename = "receive_message")]
    ReceiveMessage(MessageView),
    /// Someone in the room started or stopped typing.
    #[serde(rename = "typing_indicator")]
    TypingIndicator(TypingIndicator),
    /// A user came online or went offline.
    #[serde(rename = "user_status")]
    UserStatus(UserStatus),
    /// A client event could not be processed.
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

impl OutboundEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewRequest(_) => "newRequest",
            Self::RequestUpdated(_) => "requestUpdated",
            Self::SessionRequestReceived(_) => "session-request-received",
            Self::SessionStatusUpdated(_) => "session-status-updated",
            Self::SessionCompleted(_) => "session-completed",
            Self::SessionCancelled(_) => "session-cancelled",
            Self::ReceiveMessage(_) => "receive_message",
            Self::TypingIndicator(_) => "typing_indicator",
            Self::UserStatus(_) => "user_status",
            Self::Error(_) => "error",
        }
    }
}

impl From<DomainEvent> for OutboundEvent {
    fn from(event: DomainEvent) -> Self {
        match event {
            DomainEvent::NewRequest(view) => Self::NewRequest(view),
            DomainEvent::RequestUpdated(view) => Self::RequestUpdated(view),
            DomainEvent::SessionRequestReceived(view) => Self::SessionRequestReceived(view),
            DomainEvent::SessionStatusUpdated(view) => Self::SessionStatusUpdated(view),
            DomainEvent::SessionCompleted(view) => Self::SessionCompleted(view),
            DomainEvent::SessionCancelled(view) => Self::SessionCancelled(view),
        }
    }
}

impl From<&AppError> for OutboundEvent {
    fn from(err: &AppError) -> Self {
        Self::Error(ErrorPayload {
            code: err.kind.to_string(),
            message: err.message.clone(),
        })
    }
}

/// Payload of `user_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    /// The user whose presence changed.
    pub user_id: UserId,
    /// New presence.
    pub status: PresenceStatus,
}

/// Payload of `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error kind, e.g. `INVALID_INPUT`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_inbound_envelope() {
        let a = UserId::new();
        let b = UserId::new();
        let room = RoomKey::for_pair(a, b);
        let raw = json!({
            "event": "typing_indicator",
            "data": {"roomId": room.as_str(), "userId": a.to_string(), "isTyping": true}
        });

        let event: InboundEvent = serde_json::from_value(raw).unwrap();
        assert_eq!(
            event,
            InboundEvent::TypingIndicator(TypingIndicator {
                room_id: room,
                user_id: a,
                is_typing: true,
            })
        );
    }

    #[test]
    fn test_join_accepts_bare_and_object_ids() {
        let user = UserId::new();
        let expected = InboundEvent::Join(JoinPayload { user_id: user });

        let bare = json!({"event": "join", "data": user.to_string()});
        assert_eq!(serde_json::from_value::<InboundEvent>(bare).unwrap(), expected);

        let object = json!({"event": "join", "data": {"userId": user.to_string()}});
        assert_eq!(serde_json::from_value::<InboundEvent>(object).unwrap(), expected);

        let garbage = json!({"event": "join", "data": 42});
        assert!(serde_json::from_value::<InboundEvent>(garbage).is_err());
    }

    #[test]
    fn test_inbound_rejects_bad_room_key() {
        let raw = json!({"event": "join_chat", "data": {"roomId": "lobby"}});
        assert!(serde_json::from_value::<InboundEvent>(raw).is_err());

        let raw = json!({"event": "subscribe", "data": {}});
        assert!(serde_json::from_value::<InboundEvent>(raw).is_err());
    }

    #[test]
    fn test_outbound_envelope() {
        let user = UserId::new();
        let event = OutboundEvent::UserStatus(UserStatus {
            user_id: user,
            status: PresenceStatus::Online,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"event": "user_status", "data": {"userId": user.to_string(), "status": "online"}})
        );
        assert_eq!(value["event"], event.name());
    }

    #[test]
    fn test_error_event_from_app_error() {
        let err = AppError::forbidden("Not your room");
        let value = serde_json::to_value(OutboundEvent::from(&err)).unwrap();
        assert_eq!(
            value,
            json!({"event": "error", "data": {"code": "FORBIDDEN", "message": "Not your room"}})
        );
    }
}
