//! Session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::{SessionId, UserId};
use mentorlink_entity::session::{NewSession, Session, SessionStatus};

use super::storage_error;
use crate::store::SessionStore;

const COLUMNS: &str = "id, student_id, mentor_id, title, description, scheduled_at, status, \
                       feedback, completed_at, cancelled_at, created_at, updated_at";

/// Sessions stored in `sessions`. Cancellation sets `status = 'cancelled'`.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, input: NewSession) -> AppResult<Session> {
        let session = input.into_pending();
        let sql = format!(
            "INSERT INTO sessions ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(session.id)
            .bind(session.student_id)
            .bind(session.mentor_id)
            .bind(&session.title)
            .bind(&session.description)
            .bind(session.scheduled_at)
            .bind(session.status)
            .bind(&session.feedback)
            .bind(session.completed_at)
            .bind(session.cancelled_at)
            .bind(session.created_at)
            .bind(session.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("Failed to create session"))
    }

    async fn find_active(&self, id: SessionId) -> AppResult<Option<Session>> {
        let sql = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1 AND status <> 'cancelled'");
        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to load session"))
    }

    async fn transition(
        &self,
        id: SessionId,
        expected: SessionStatus,
        next: SessionStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let sql = format!(
            "UPDATE sessions SET status = $3, updated_at = $4 \
             WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(expected)
            .bind(next)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to update session status"))
    }

    async fn complete(
        &self,
        id: SessionId,
        feedback: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let sql = format!(
            "UPDATE sessions SET status = 'completed', feedback = $2, completed_at = $3, updated_at = $3 \
             WHERE id = $1 AND status = 'accepted' RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(feedback)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to complete session"))
    }

    async fn cancel(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        let sql = format!(
            "UPDATE sessions SET status = 'cancelled', cancelled_at = $2, updated_at = $2 \
             WHERE id = $1 AND status IN ('pending', 'accepted') RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to cancel session"))
    }

    async fn find_for_user(&self, user: UserId) -> AppResult<Vec<Session>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM sessions \
             WHERE (student_id = $1 OR mentor_id = $1) AND status <> 'cancelled' \
             ORDER BY scheduled_at DESC, id DESC"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(user)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list sessions"))
    }

    async fn find_resolved_for(&self, user: UserId) -> AppResult<Vec<Session>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM sessions \
             WHERE (student_id = $1 OR mentor_id = $1) \
               AND status IN ('accepted', 'declined', 'rejected') \
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Session>(&sql)
            .bind(user)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list resolved sessions"))
    }
}
