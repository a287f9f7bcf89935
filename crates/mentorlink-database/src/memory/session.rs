//! In-memory session store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::{SessionId, UserId};
use mentorlink_entity::session::{NewSession, Session, SessionStatus};

use crate::store::SessionStore;

/// Sessions held in memory. Cancelled rows are kept for history.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    rows: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `update` when the row exists and `guard` accepts its status.
    async fn update_if<G, U>(&self, id: SessionId, guard: G, update: U) -> Option<Session>
    where
        G: Fn(SessionStatus) -> bool,
        U: FnOnce(&mut Session),
    {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).filter(|row| guard(row.status))?;
        update(row);
        Some(row.clone())
    }

    /// Overwrite a row. Lets tests place sessions in states the engines
    /// would not produce on their own, such as an accepted session in the past.
    pub async fn put(&self, session: Session) {
        self.rows.write().await.insert(session.id, session);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: NewSession) -> AppResult<Session> {
        let session = input.into_pending();
        self.rows.write().await.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_active(&self, id: SessionId) -> AppResult<Option<Session>> {
        Ok(self
            .rows
            .read()
            .await
            .get(&id)
            .filter(|s| s.status != SessionStatus::Cancelled)
            .cloned())
    }

    async fn transition(
        &self,
        id: SessionId,
        expected: SessionStatus,
        next: SessionStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        Ok(self
            .update_if(
                id,
                |status| status == expected && status != SessionStatus::Cancelled,
                |row| {
                    row.status = next;
                    row.updated_at = at;
                },
            )
            .await)
    }

    async fn complete(
        &self,
        id: SessionId,
        feedback: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        Ok(self
            .update_if(
                id,
                |status| status == SessionStatus::Accepted,
                |row| {
                    row.status = SessionStatus::Completed;
                    row.feedback = feedback;
                    row.completed_at = Some(at);
                    row.updated_at = at;
                },
            )
            .await)
    }

    async fn cancel(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        Ok(self
            .update_if(
                id,
                |status| status.is_cancellable(),
                |row| {
                    row.status = SessionStatus::Cancelled;
                    row.cancelled_at = Some(at);
                    row.updated_at = at;
                },
            )
            .await)
    }

    async fn find_for_user(&self, user: UserId) -> AppResult<Vec<Session>> {
        let mut rows: Vec<Session> = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.involves(user) && s.status != SessionStatus::Cancelled)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.scheduled_at, b.id).cmp(&(a.scheduled_at, a.id)));
        Ok(rows)
    }

    async fn find_resolved_for(&self, user: UserId) -> AppResult<Vec<Session>> {
        let mut rows: Vec<Session> = self
            .rows
            .read()
            .await
            .values()
            .filter(|s| {
                s.involves(user)
                    && matches!(
                        s.status,
                        SessionStatus::Accepted | SessionStatus::Declined | SessionStatus::Rejected
                    )
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        Ok(rows)
    }
}
