//! Message repository.

use async_trait::async_trait;
use sqlx::PgPool;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::{MessageId, UserId};
use mentorlink_entity::message::{ConversationRow, Message, NewMessage};

use super::storage_error;
use crate::store::MessageStore;

const COLUMNS: &str = "id, sender_id, recipient_id, content, read, created_at";

/// Latest message per counterparty plus the unread count from that
/// counterparty, newest conversation first.
const CONVERSATIONS_SQL: &str = r#"
WITH thread AS (
    SELECT m.id, m.sender_id, m.recipient_id, m.content, m.read, m.created_at,
           CASE WHEN m.sender_id = $1 THEN m.recipient_id ELSE m.sender_id END AS counterparty_id
    FROM messages m
    WHERE m.sender_id = $1 OR m.recipient_id = $1
),
ranked AS (
    SELECT thread.*,
           ROW_NUMBER() OVER (
               PARTITION BY counterparty_id ORDER BY created_at DESC, id DESC
           ) AS rn,
           COUNT(*) FILTER (WHERE recipient_id = $1 AND NOT read) OVER (
               PARTITION BY counterparty_id
           ) AS unread_count
    FROM thread
)
SELECT id, sender_id, recipient_id, content, read, created_at, counterparty_id, unread_count
FROM ranked
WHERE rn = 1
ORDER BY created_at DESC, counterparty_id ASC
"#;

/// Messages stored in `messages`.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn create(&self, input: NewMessage) -> AppResult<Message> {
        let message = input.into_unread();
        let sql = format!(
            "INSERT INTO messages ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&sql)
            .bind(message.id)
            .bind(message.sender_id)
            .bind(message.recipient_id)
            .bind(&message.content)
            .bind(message.read)
            .bind(message.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("Failed to store message"))
    }

    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        let sql = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to load message"))
    }

    async fn find_thread(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1) \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&sql)
            .bind(a)
            .bind(b)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to load thread"))
    }

    async fn mark_thread_read(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        sqlx::query(
            "UPDATE messages SET read = TRUE \
             WHERE sender_id = $1 AND recipient_id = $2 AND read = FALSE",
        )
        .bind(sender)
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map(|done| done.rows_affected())
        .map_err(storage_error("Failed to mark thread read"))
    }

    async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>> {
        let sql = format!("UPDATE messages SET read = TRUE WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to mark message read"))
    }

    async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages \
             WHERE sender_id = $1 AND recipient_id = $2 AND read = FALSE",
        )
        .bind(sender)
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("Failed to count unread messages"))
    }

    async fn conversations(&self, user: UserId) -> AppResult<Vec<ConversationRow>> {
        sqlx::query_as::<_, ConversationRow>(CONVERSATIONS_SQL)
            .bind(user)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list conversations"))
    }
}
