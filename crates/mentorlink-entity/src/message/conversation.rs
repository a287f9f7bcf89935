//! Conversation list entries.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mentorlink_core::types::UserId;

use super::model::Message;
use crate::user::UserSummary;

/// One row per counterparty as produced by a message store.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ConversationRow {
    /// The other participant.
    pub counterparty_id: UserId,
    /// Newest message exchanged with the counterparty.
    #[sqlx(flatten)]
    pub last_message: Message,
    /// Unread messages sent by the counterparty.
    pub unread_count: i64,
}

impl ConversationRow {
    /// Newest conversation first; equal timestamps fall back to the
    /// counterparty id, ascending.
    pub fn recency_order(a: &Self, b: &Self) -> Ordering {
        b.last_message
            .created_at
            .cmp(&a.last_message.created_at)
            .then_with(|| a.counterparty_id.cmp(&b.counterparty_id))
    }
}

/// A conversation entry with the counterparty's display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// The other participant.
    pub counterparty_id: UserId,
    /// Counterparty display fields.
    pub counterparty: Option<UserSummary>,
    /// Newest message in the thread.
    pub last_message: Message,
    /// Unread messages sent by the counterparty.
    pub unread_count: i64,
}
