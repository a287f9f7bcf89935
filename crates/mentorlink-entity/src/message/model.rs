//! Message record and its populated view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mentorlink_core::types::{MessageId, UserId};

use crate::user::UserSummary;

/// A direct message between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique, time-ordered identifier.
    pub id: MessageId,
    /// Author.
    pub sender_id: UserId,
    /// Addressee.
    pub recipient_id: UserId,
    /// Message body. Never blank.
    pub content: String,
    /// Set once the recipient has seen the message.
    pub read: bool,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The other party from `user`'s point of view.
    pub fn counterparty_of(&self, user: UserId) -> UserId {
        if self.sender_id == user {
            self.recipient_id
        } else {
            self.sender_id
        }
    }
}

/// Validated input for storing a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Author.
    pub sender_id: UserId,
    /// Addressee.
    pub recipient_id: UserId,
    /// Trimmed, non-empty body.
    pub content: String,
}

impl NewMessage {
    /// Materialise the unread record for this input.
    pub fn into_unread(self) -> Message {
        Message {
            id: MessageId::new(),
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            content: self.content,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// A message with sender and recipient display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    /// The persisted record.
    #[serde(flatten)]
    pub message: Message,
    /// Sender display fields.
    pub sender: Option<UserSummary>,
    /// Recipient display fields.
    pub recipient: Option<UserSummary>,
}
