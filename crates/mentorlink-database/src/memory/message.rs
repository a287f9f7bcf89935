//! In-memory message store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::{MessageId, UserId};
use mentorlink_entity::message::{ConversationRow, Message, NewMessage};

use crate::store::MessageStore;

/// Messages held in memory.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    rows: RwLock<HashMap<MessageId, Message>>,
}

impl MemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a row, e.g. to pin `created_at` in ordering tests.
    pub async fn put(&self, message: Message) {
        self.rows.write().await.insert(message.id, message);
    }
}

fn chronological(a: &Message, b: &Message) -> std::cmp::Ordering {
    (a.created_at, a.id).cmp(&(b.created_at, b.id))
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(&self, input: NewMessage) -> AppResult<Message> {
        let message = input.into_unread();
        self.rows.write().await.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_thread(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        let mut thread: Vec<Message> = self
            .rows
            .read()
            .await
            .values()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .cloned()
            .collect();
        thread.sort_by(chronological);
        Ok(thread)
    }

    async fn mark_thread_read(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let mut flipped = 0;
        for message in rows.values_mut() {
            if message.sender_id == sender && message.recipient_id == recipient && !message.read {
                message.read = true;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|message| {
            message.read = true;
            message.clone()
        }))
    }

    async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<i64> {
        let count = self
            .rows
            .read()
            .await
            .values()
            .filter(|m| m.sender_id == sender && m.recipient_id == recipient && !m.read)
            .count();
        Ok(count as i64)
    }

    async fn conversations(&self, user: UserId) -> AppResult<Vec<ConversationRow>> {
        let rows = self.rows.read().await;
        let mut by_counterparty: HashMap<UserId, ConversationRow> = HashMap::new();

        for message in rows
            .values()
            .filter(|m| m.sender_id == user || m.recipient_id == user)
        {
            let counterparty = message.counterparty_of(user);
            let unread = i64::from(message.recipient_id == user && !message.read);
            by_counterparty
                .entry(counterparty)
                .and_modify(|row| {
                    row.unread_count += unread;
                    if chronological(&row.last_message, message).is_lt() {
                        row.last_message = message.clone();
                    }
                })
                .or_insert_with(|| ConversationRow {
                    counterparty_id: counterparty,
                    last_message: message.clone(),
                    unread_count: unread,
                });
        }

        let mut summaries: Vec<ConversationRow> = by_counterparty.into_values().collect();
        summaries.sort_by(ConversationRow::recency_order);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn text(sender: UserId, recipient: UserId, content: &str) -> NewMessage {
        NewMessage {
            sender_id: sender,
            recipient_id: recipient,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_thread_read_is_directional() {
        let store = MemoryMessageStore::new();
        let (a, b) = (UserId::new(), UserId::new());

        store.create(text(b, a, "hello")).await.unwrap();
        store.create(text(b, a, "are you there?")).await.unwrap();
        store.create(text(a, b, "yes")).await.unwrap();

        assert_eq!(store.count_unread(b, a).await.unwrap(), 2);
        assert_eq!(store.mark_thread_read(b, a).await.unwrap(), 2);
        assert_eq!(store.count_unread(b, a).await.unwrap(), 0);
        assert_eq!(store.count_unread(a, b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_conversations_latest_and_unread() {
        let store = MemoryMessageStore::new();
        let (me, alice, bob) = (UserId::new(), UserId::new(), UserId::new());
        let base = Utc::now();

        let mut old = text(alice, me, "old").into_unread();
        old.created_at = base - Duration::minutes(10);
        store.put(old).await;

        let mut newest = text(me, bob, "newest").into_unread();
        newest.created_at = base;
        store.put(newest.clone()).await;

        let mut latest_alice = text(alice, me, "latest from alice").into_unread();
        latest_alice.created_at = base - Duration::minutes(5);
        store.put(latest_alice.clone()).await;

        let rows = store.conversations(me).await.unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].counterparty_id, bob);
        assert_eq!(rows[0].last_message, newest);
        assert_eq!(rows[0].unread_count, 0);

        assert_eq!(rows[1].counterparty_id, alice);
        assert_eq!(rows[1].last_message, latest_alice);
        assert_eq!(rows[1].unread_count, 2);
    }
}
