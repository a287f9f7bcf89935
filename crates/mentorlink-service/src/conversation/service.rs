//! Direct messaging between two users.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mentorlink_core::config::ConversationConfig;
use mentorlink_core::error::AppError;
use mentorlink_core::types::{MessageId, UserId, parse_required};
use mentorlink_database::MessageStore;
use mentorlink_entity::message::{ConversationSummary, MessageView, NewMessage};
use mentorlink_entity::user::UserSummary;

use crate::context::RequestContext;
use crate::directory::DisplayResolver;

/// Persists messages and answers thread, unread, and summary queries.
#[derive(Debug, Clone)]
pub struct ConversationService {
    store: Arc<dyn MessageStore>,
    resolver: DisplayResolver,
    config: ConversationConfig,
}

/// Client input for posting a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostMessage {
    /// Author id.
    pub sender: Option<String>,
    /// Addressee id.
    pub recipient: Option<String>,
    /// Message body.
    pub content: Option<String>,
}

impl ConversationService {
    /// Creates a new conversation service.
    pub fn new(
        store: Arc<dyn MessageStore>,
        resolver: DisplayResolver,
        config: ConversationConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
        }
    }

    /// Stores an unread message from the caller.
    pub async fn post_message(
        &self,
        ctx: &RequestContext,
        input: PostMessage,
    ) -> Result<MessageView, AppError> {
        let sender_id: UserId = parse_required("sender", input.sender.as_deref())?;
        let recipient_id: UserId = parse_required("recipient", input.recipient.as_deref())?;
        if sender_id == recipient_id {
            return Err(AppError::invalid_input("Cannot send a message to yourself"));
        }

        let content = input.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(AppError::invalid_input("Message content must not be empty"));
        }
        let length = content.chars().count();
        if length > self.config.max_content_length {
            return Err(AppError::invalid_input(format!(
                "Message content is {length} characters; the limit is {}",
                self.config.max_content_length
            )));
        }

        ctx.ensure_is(sender_id, "send this message")?;

        let message = self
            .store
            .create(NewMessage {
                sender_id,
                recipient_id,
                content,
            })
            .await?;
        debug!(message_id = %message.id, sender = %sender_id, recipient = %recipient_id, "Message stored");

        Ok(self.resolver.message(message).await)
    }

    /// The thread between `user_a` and `user_b`, oldest first.
    ///
    /// When the caller is `user_a`, messages from `user_b` are marked read
    /// before the thread is loaded.
    pub async fn list_messages(
        &self,
        ctx: &RequestContext,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<Vec<MessageView>, AppError> {
        ctx.ensure_one_of(&[user_a, user_b], "read this conversation")?;

        if ctx.user_id == user_a {
            let flipped = self.store.mark_thread_read(user_b, user_a).await?;
            if flipped > 0 {
                info!(reader = %user_a, from = %user_b, count = flipped, "Messages marked read");
            }
        }

        let thread = self.store.find_thread(user_a, user_b).await?;
        Ok(self.resolver.messages(thread).await)
    }

    /// Marks one message read. Repeating the call is harmless.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        message_id: MessageId,
    ) -> Result<MessageView, AppError> {
        let message = self
            .store
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message {message_id} not found")))?;
        ctx.ensure_is(message.recipient_id, "mark this message read")?;

        let message = self
            .store
            .mark_read(message_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Message {message_id} not found")))?;
        Ok(self.resolver.message(message).await)
    }

    /// Unread messages sent by `user_b` to `user_a`.
    pub async fn unread_count(
        &self,
        ctx: &RequestContext,
        user_a: UserId,
        user_b: UserId,
    ) -> Result<i64, AppError> {
        ctx.ensure_one_of(&[user_a, user_b], "read this conversation")?;
        self.store.count_unread(user_b, user_a).await
    }

    /// One summary per counterparty, most recent conversation first.
    pub async fn list_conversations(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, AppError> {
        ctx.ensure_is(user_id, "list these conversations")?;
        let rows = self.store.conversations(user_id).await?;
        Ok(self.resolver.conversations(rows).await)
    }

    /// Directory lookup for a prospective counterparty.
    pub async fn find_user(&self, user_id: UserId) -> Result<UserSummary, AppError> {
        self.resolver
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use mentorlink_core::ErrorKind;
    use mentorlink_entity::user::UserRole;

    fn service(fx: &Fixture) -> ConversationService {
        ConversationService::new(
            fx.stores.messages.clone(),
            DisplayResolver::new(fx.stores.directory.clone()),
            ConversationConfig {
                max_content_length: 20,
            },
        )
    }

    fn text(from: &RequestContext, to: &RequestContext, content: &str) -> PostMessage {
        PostMessage {
            sender: Some(from.user_id.to_string()),
            recipient: Some(to.user_id.to_string()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn test_post_validation() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let a = fx.user("Mia", UserRole::Mentee);
        let b = fx.user("Omar", UserRole::Mentor);

        for content in ["", "   ", "this message is far too long"] {
            let err = svc.post_message(&a, text(&a, &b, content)).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput, "{content:?}");
        }
        let own = svc.post_message(&a, text(&a, &a, "hi")).await.unwrap_err();
        assert_eq!(own.kind, ErrorKind::InvalidInput);

        let spoofed = svc.post_message(&b, text(&a, &b, "hi")).await.unwrap_err();
        assert_eq!(spoofed.kind, ErrorKind::Forbidden);

        let view = svc.post_message(&a, text(&a, &b, "hello")).await.unwrap();
        assert!(!view.message.read);
        assert_eq!(view.sender.unwrap().name, "Mia");
    }

    #[tokio::test]
    async fn test_opening_thread_marks_incoming_read() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let a = fx.user("Mia", UserRole::Mentee);
        let b = fx.user("Omar", UserRole::Mentor);

        svc.post_message(&a, text(&a, &b, "one")).await.unwrap();
        svc.post_message(&b, text(&b, &a, "two")).await.unwrap();
        svc.post_message(&b, text(&b, &a, "three")).await.unwrap();

        assert_eq!(svc.unread_count(&a, a.user_id, b.user_id).await.unwrap(), 2);
        assert_eq!(svc.unread_count(&b, b.user_id, a.user_id).await.unwrap(), 1);

        // Reading from b's side leaves a's unread untouched.
        let thread = svc.list_messages(&b, a.user_id, b.user_id).await.unwrap();
        assert_eq!(thread.len(), 3);
        assert_eq!(svc.unread_count(&a, a.user_id, b.user_id).await.unwrap(), 2);

        let thread = svc.list_messages(&a, a.user_id, b.user_id).await.unwrap();
        let contents: Vec<_> = thread.iter().map(|m| m.message.content.as_str()).collect();
        assert_eq!(contents, ["one", "two", "three"]);
        assert!(thread[1].message.read && thread[2].message.read);
        assert!(!thread[0].message.read);
        assert_eq!(svc.unread_count(&a, a.user_id, b.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent_and_recipient_only() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let a = fx.user("Mia", UserRole::Mentee);
        let b = fx.user("Omar", UserRole::Mentor);

        let sent = svc.post_message(&a, text(&a, &b, "ping")).await.unwrap();
        let id = sent.message.id;

        let err = svc.mark_read(&a, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        assert!(svc.mark_read(&b, id).await.unwrap().message.read);
        assert!(svc.mark_read(&b, id).await.unwrap().message.read);

        let missing = svc.mark_read(&b, MessageId::new()).await.unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_conversation_summaries() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let a = fx.user("Mia", UserRole::Mentee);
        let b = fx.user("Omar", UserRole::Mentor);
        let c = fx.user("Lena", UserRole::Mentor);

        svc.post_message(&b, text(&b, &a, "from b")).await.unwrap();
        svc.post_message(&c, text(&c, &a, "from c")).await.unwrap();
        svc.post_message(&c, text(&c, &a, "again c")).await.unwrap();

        let summaries = svc.list_conversations(&a, a.user_id).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].counterparty_id, c.user_id);
        assert_eq!(summaries[0].unread_count, 2);
        assert_eq!(summaries[0].last_message.content, "again c");
        assert_eq!(summaries[0].counterparty.as_ref().unwrap().name, "Lena");
        assert_eq!(summaries[1].counterparty_id, b.user_id);

        let err = svc.list_conversations(&b, a.user_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_find_user() {
        let fx = Fixture::new();
        let svc = service(&fx);
        let a = fx.user("Mia", UserRole::Mentee);

        assert_eq!(svc.find_user(a.user_id).await.unwrap().name, "Mia");
        let err = svc.find_user(UserId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
