//! Connection request repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use mentorlink_core::error::AppError;
use mentorlink_core::result::AppResult;
use mentorlink_core::types::{RequestId, UserId};
use mentorlink_entity::request::{ConnectionRequest, RequestStatus};

use super::{is_unique_violation, storage_error};
use crate::store::RequestStore;

const COLUMNS: &str = "id, from_user_id, to_user_id, status, created_at, resolved_at";

/// Connection requests stored in `connection_requests`.
///
/// The partial unique index `connection_requests_one_pending` is the final
/// arbiter of the one-pending-per-pair rule.
#[derive(Debug, Clone)]
pub struct ConnectionRequestRepository {
    pool: PgPool,
}

impl ConnectionRequestRepository {
    /// Create a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for ConnectionRequestRepository {
    async fn create(&self, from: UserId, to: UserId) -> AppResult<ConnectionRequest> {
        let request = ConnectionRequest::pending(from, to);
        let sql = format!(
            "INSERT INTO connection_requests ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );

        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(request.id)
            .bind(request.from_user_id)
            .bind(request.to_user_id)
            .bind(request.status)
            .bind(request.created_at)
            .bind(request.resolved_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    debug!(from = %from, to = %to, "Pending request rejected by unique index");
                    AppError::duplicate_pending("Request already sent")
                } else {
                    storage_error("Failed to create connection request")(e)
                }
            })
    }

    async fn find_by_id(&self, id: RequestId) -> AppResult<Option<ConnectionRequest>> {
        let sql = format!("SELECT {COLUMNS} FROM connection_requests WHERE id = $1");
        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to load connection request"))
    }

    async fn find_pending(&self, from: UserId, to: UserId) -> AppResult<Option<ConnectionRequest>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM connection_requests \
             WHERE from_user_id = $1 AND to_user_id = $2 AND status = 'pending'"
        );
        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to look up pending request"))
    }

    async fn resolve(
        &self,
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
    ) -> AppResult<Option<ConnectionRequest>> {
        let sql = format!(
            "UPDATE connection_requests SET status = $2, resolved_at = GREATEST($3, created_at) \
             WHERE id = $1 AND status = 'pending' RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(resolved_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("Failed to resolve connection request"))
    }

    async fn find_sent_by(&self, from: UserId) -> AppResult<Vec<ConnectionRequest>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM connection_requests WHERE from_user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(from)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list sent requests"))
    }

    async fn find_pending_for(&self, to: UserId) -> AppResult<Vec<ConnectionRequest>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM connection_requests \
             WHERE to_user_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list pending requests"))
    }

    async fn find_resolved_for(&self, to: UserId) -> AppResult<Vec<ConnectionRequest>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM connection_requests \
             WHERE to_user_id = $1 AND status IN ('accepted', 'rejected') \
             ORDER BY resolved_at DESC, id DESC"
        );
        sqlx::query_as::<_, ConnectionRequest>(&sql)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("Failed to list resolved requests"))
    }
}
