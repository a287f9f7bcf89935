//! In-memory user directory.

use async_trait::async_trait;
use dashmap::DashMap;

use mentorlink_core::result::AppResult;
use mentorlink_core::types::UserId;
use mentorlink_entity::user::UserSummary;

use crate::store::UserDirectory;

/// Directory seeded by the caller; stands in for the external profile
/// service in tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: DashMap<UserId, UserSummary>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub fn insert(&self, user: UserSummary) {
        self.users.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find(&self, id: UserId) -> AppResult<Option<UserSummary>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<UserSummary>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}
