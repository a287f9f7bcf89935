//! Display-field population through the user directory.
//!
//! Records only carry user ids. Before a record leaves the core it is paired
//! with the directory's display fields; a directory outage degrades to
//! missing fields instead of failing the command.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::UserId;
use mentorlink_database::UserDirectory;
use mentorlink_entity::message::{ConversationRow, ConversationSummary, Message, MessageView};
use mentorlink_entity::request::{ConnectionRequest, RequestView};
use mentorlink_entity::session::{Session, SessionView};
use mentorlink_entity::user::UserSummary;

/// Resolves user ids into display records.
#[derive(Debug, Clone)]
pub struct DisplayResolver {
    directory: Arc<dyn UserDirectory>,
}

type Directory = HashMap<UserId, UserSummary>;

impl DisplayResolver {
    /// Creates a resolver over `directory`.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Looks up a single user, propagating directory errors.
    pub async fn find_user(&self, id: UserId) -> AppResult<Option<UserSummary>> {
        self.directory.find(id).await
    }

    async fn lookup(&self, ids: impl IntoIterator<Item = UserId>) -> Directory {
        let mut ids: Vec<UserId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        match self.directory.find_many(&ids).await {
            Ok(users) => users.into_iter().map(|u| (u.id, u)).collect(),
            Err(e) => {
                warn!(error = %e, count = ids.len(), "Directory lookup failed, omitting display fields");
                Directory::new()
            }
        }
    }

    /// Pairs requests with requester and recipient display fields.
    pub async fn requests(&self, requests: Vec<ConnectionRequest>) -> Vec<RequestView> {
        let users = self
            .lookup(requests.iter().flat_map(|r| [r.from_user_id, r.to_user_id]))
            .await;
        requests
            .into_iter()
            .map(|request| RequestView {
                from: users.get(&request.from_user_id).cloned(),
                to: users.get(&request.to_user_id).cloned(),
                request,
            })
            .collect()
    }

    /// Pairs one request with display fields.
    pub async fn request(&self, request: ConnectionRequest) -> RequestView {
        let id = request.id;
        self.requests(vec![request])
            .await
            .pop()
            .unwrap_or_else(|| unreachable!("one request in, one view out ({id})"))
    }

    /// Pairs sessions with student and mentor display fields.
    pub async fn sessions(&self, sessions: Vec<Session>) -> Vec<SessionView> {
        let users = self
            .lookup(sessions.iter().flat_map(Session::participants))
            .await;
        sessions
            .into_iter()
            .map(|session| SessionView {
                student: users.get(&session.student_id).cloned(),
                mentor: users.get(&session.mentor_id).cloned(),
                session,
            })
            .collect()
    }

    /// Pairs one session with display fields.
    pub async fn session(&self, session: Session) -> SessionView {
        let id = session.id;
        self.sessions(vec![session])
            .await
            .pop()
            .unwrap_or_else(|| unreachable!("one session in, one view out ({id})"))
    }

    /// Pairs messages with sender and recipient display fields.
    pub async fn messages(&self, messages: Vec<Message>) -> Vec<MessageView> {
        let users = self
            .lookup(messages.iter().flat_map(|m| [m.sender_id, m.recipient_id]))
            .await;
        messages
            .into_iter()
            .map(|message| MessageView {
                sender: users.get(&message.sender_id).cloned(),
                recipient: users.get(&message.recipient_id).cloned(),
                message,
            })
            .collect()
    }

    /// Pairs one message with display fields.
    pub async fn message(&self, message: Message) -> MessageView {
        let id = message.id;
        self.messages(vec![message])
            .await
            .pop()
            .unwrap_or_else(|| unreachable!("one message in, one view out ({id})"))
    }

    /// Pairs conversation rows with the counterparty's display fields.
    pub async fn conversations(&self, rows: Vec<ConversationRow>) -> Vec<ConversationSummary> {
        let users = self.lookup(rows.iter().map(|r| r.counterparty_id)).await;
        rows.into_iter()
            .map(|row| ConversationSummary {
                counterparty: users.get(&row.counterparty_id).cloned(),
                counterparty_id: row.counterparty_id,
                last_message: row.last_message,
                unread_count: row.unread_count,
            })
            .collect()
    }
}
