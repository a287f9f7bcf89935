//! Store traits consumed by the engines, and the bundle that wires them.
//!
//! Each trait is deliberately narrow: the engines own validation and actor
//! checks, the stores own persistence and the conditional updates that make
//! state transitions race-safe.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use mentorlink_core::config::{DatabaseConfig, DatabaseProvider};
use mentorlink_core::result::AppResult;
use mentorlink_core::types::{MessageId, RequestId, SessionId, UserId};
use mentorlink_entity::message::{ConversationRow, Message, NewMessage};
use mentorlink_entity::request::{ConnectionRequest, RequestStatus};
use mentorlink_entity::session::{NewSession, Session, SessionStatus};
use mentorlink_entity::user::UserSummary;

use crate::connection::DatabasePool;
use crate::memory::{MemoryDirectory, MemoryMessageStore, MemoryRequestStore, MemorySessionStore};
use crate::migration::run_migrations;
use crate::repositories::{
    ConnectionRequestRepository, MessageRepository, SessionRepository, UserRepository,
};

/// Persistence for connection requests.
#[async_trait]
pub trait RequestStore: Send + Sync + Debug + 'static {
    /// Insert a pending request.
    ///
    /// Fails with `DUPLICATE_PENDING` when a pending request for the same
    /// `(from, to)` pair already exists.
    async fn create(&self, from: UserId, to: UserId) -> AppResult<ConnectionRequest>;

    /// Look up a request by id.
    async fn find_by_id(&self, id: RequestId) -> AppResult<Option<ConnectionRequest>>;

    /// The pending request for a pair, if any.
    async fn find_pending(&self, from: UserId, to: UserId) -> AppResult<Option<ConnectionRequest>>;

    /// Move a pending request to `status`.
    ///
    /// Returns `None` when the request is no longer pending.
    async fn resolve(
        &self,
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
    ) -> AppResult<Option<ConnectionRequest>>;

    /// Requests sent by `from`, newest first.
    async fn find_sent_by(&self, from: UserId) -> AppResult<Vec<ConnectionRequest>>;

    /// Pending requests addressed to `to`, newest first.
    async fn find_pending_for(&self, to: UserId) -> AppResult<Vec<ConnectionRequest>>;

    /// Accepted or rejected requests addressed to `to`, most recently resolved first.
    async fn find_resolved_for(&self, to: UserId) -> AppResult<Vec<ConnectionRequest>>;
}

/// Persistence for sessions.
///
/// Cancelled sessions stay in storage but are invisible to every method
/// except the one that cancels them.
#[async_trait]
pub trait SessionStore: Send + Sync + Debug + 'static {
    /// Insert a pending session.
    async fn create(&self, input: NewSession) -> AppResult<Session>;

    /// Look up a non-cancelled session.
    async fn find_active(&self, id: SessionId) -> AppResult<Option<Session>>;

    /// Move a session from `expected` to `next`.
    ///
    /// Returns `None` when the session is missing, cancelled, or no longer
    /// in `expected`.
    async fn transition(
        &self,
        id: SessionId,
        expected: SessionStatus,
        next: SessionStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Complete an accepted session and store its feedback.
    async fn complete(
        &self,
        id: SessionId,
        feedback: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Soft-delete a pending or accepted session.
    async fn cancel(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>>;

    /// Non-cancelled sessions involving `user`, latest `scheduled_at` first.
    async fn find_for_user(&self, user: UserId) -> AppResult<Vec<Session>>;

    /// Accepted, declined, or rejected sessions involving `user`, most
    /// recently updated first.
    async fn find_resolved_for(&self, user: UserId) -> AppResult<Vec<Session>>;
}

/// Persistence for direct messages.
#[async_trait]
pub trait MessageStore: Send + Sync + Debug + 'static {
    /// Insert an unread message.
    async fn create(&self, input: NewMessage) -> AppResult<Message>;

    /// Look up a message by id.
    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Both directions of the thread between `a` and `b`, oldest first.
    async fn find_thread(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>>;

    /// Mark every unread message from `sender` to `recipient` as read.
    ///
    /// Returns the number of rows flipped.
    async fn mark_thread_read(&self, sender: UserId, recipient: UserId) -> AppResult<u64>;

    /// Mark one message as read. Returns `None` if it does not exist.
    async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>>;

    /// Unread messages from `sender` to `recipient`.
    async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<i64>;

    /// One row per counterparty of `user` with the newest message and the
    /// unread count from that counterparty.
    async fn conversations(&self, user: UserId) -> AppResult<Vec<ConversationRow>>;
}

/// Read-only view of the external user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug + 'static {
    /// Look up a single user.
    async fn find(&self, id: UserId) -> AppResult<Option<UserSummary>>;

    /// Look up several users; unknown ids are omitted.
    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<UserSummary>>;
}

/// The full set of stores the engines depend on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Connection requests.
    pub requests: Arc<dyn RequestStore>,
    /// Sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Messages.
    pub messages: Arc<dyn MessageStore>,
    /// User directory.
    pub directory: Arc<dyn UserDirectory>,
    /// Pool handle when backed by PostgreSQL.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Process-local stores sharing the given directory.
    pub fn memory(directory: Arc<MemoryDirectory>) -> Self {
        Self {
            requests: Arc::new(MemoryRequestStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            messages: Arc::new(MemoryMessageStore::new()),
            directory,
            pool: None,
        }
    }

    /// PostgreSQL-backed stores over an existing pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            requests: Arc::new(ConnectionRequestRepository::new(pg.clone())),
            sessions: Arc::new(SessionRepository::new(pg.clone())),
            messages: Arc::new(MessageRepository::new(pg.clone())),
            directory: Arc::new(UserRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Build the stores selected by configuration, connecting and migrating
    /// when the provider is PostgreSQL.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Memory => {
                info!("Using in-memory stores; state is lost on restart");
                Ok(Self::memory(Arc::new(MemoryDirectory::new())))
            }
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    /// Check that the backing store answers.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }
}
