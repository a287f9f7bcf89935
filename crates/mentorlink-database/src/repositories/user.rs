//! Read-only directory lookups against the `users` projection.

use async_trait::async_trait;
use sqlx::PgPool;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::UserId;
use mentorlink_entity::user::UserSummary;

use super::storage_error;
use crate::store::UserDirectory;

/// Directory backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find(&self, id: UserId) -> AppResult<Option<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, role, profile_picture FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("Failed to look up user"))
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, role, profile_picture FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("Failed to look up users"))
    }
}
