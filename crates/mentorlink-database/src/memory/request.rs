//! In-memory connection request store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use mentorlink_core::error::AppError;
use mentorlink_core::result::AppResult;
use mentorlink_core::types::{RequestId, UserId};
use mentorlink_entity::request::{ConnectionRequest, RequestStatus};

use crate::store::RequestStore;

/// Connection requests held in memory.
#[derive(Debug, Default)]
pub struct MemoryRequestStore {
    rows: RwLock<HashMap<RequestId, ConnectionRequest>>,
}

impl MemoryRequestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(&self, filter: F) -> Vec<ConnectionRequest>
    where
        F: Fn(&ConnectionRequest) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|r| filter(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn create(&self, from: UserId, to: UserId) -> AppResult<ConnectionRequest> {
        let mut rows = self.rows.write().await;
        let exists = rows.values().any(|r| {
            r.from_user_id == from && r.to_user_id == to && r.status == RequestStatus::Pending
        });
        if exists {
            return Err(AppError::duplicate_pending("Request already sent"));
        }

        let request = ConnectionRequest::pending(from, to);
        rows.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: RequestId) -> AppResult<Option<ConnectionRequest>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_pending(&self, from: UserId, to: UserId) -> AppResult<Option<ConnectionRequest>> {
        Ok(self
            .select(|r| {
                r.from_user_id == from && r.to_user_id == to && r.status == RequestStatus::Pending
            })
            .await
            .into_iter()
            .next())
    }

    async fn resolve(
        &self,
        id: RequestId,
        status: RequestStatus,
        resolved_at: DateTime<Utc>,
    ) -> AppResult<Option<ConnectionRequest>> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(row) if row.status == RequestStatus::Pending => {
                row.status = status;
                row.resolved_at = Some(resolved_at.max(row.created_at));
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_sent_by(&self, from: UserId) -> AppResult<Vec<ConnectionRequest>> {
        let mut rows = self.select(|r| r.from_user_id == from).await;
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn find_pending_for(&self, to: UserId) -> AppResult<Vec<ConnectionRequest>> {
        let mut rows = self
            .select(|r| r.to_user_id == to && r.status == RequestStatus::Pending)
            .await;
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn find_resolved_for(&self, to: UserId) -> AppResult<Vec<ConnectionRequest>> {
        let mut rows = self
            .select(|r| r.to_user_id == to && r.status.is_resolved())
            .await;
        rows.sort_by(|a, b| (b.resolved_at, b.id).cmp(&(a.resolved_at, a.id)));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use mentorlink_core::error::ErrorKind;

    #[tokio::test]
    async fn test_one_pending_per_pair() {
        let store = MemoryRequestStore::new();
        let (a, b) = (UserId::new(), UserId::new());

        store.create(a, b).await.unwrap();
        let err = store.create(a, b).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicatePending);

        // The reverse direction is a different pair.
        store.create(b, a).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_creates_admit_one() {
        let store = Arc::new(MemoryRequestStore::new());
        let (a, b) = (UserId::new(), UserId::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(a, b).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_resolve_only_once_and_frees_pair() {
        let store = MemoryRequestStore::new();
        let (a, b) = (UserId::new(), UserId::new());
        let request = store.create(a, b).await.unwrap();

        let resolved = store
            .resolve(request.id, RequestStatus::Accepted, Utc::now())
            .await
            .unwrap()
            .expect("first resolve wins");
        assert_eq!(resolved.status, RequestStatus::Accepted);
        assert!(resolved.resolved_at.unwrap() >= resolved.created_at);

        let again = store
            .resolve(request.id, RequestStatus::Rejected, Utc::now())
            .await
            .unwrap();
        assert!(again.is_none());

        // A resolved request no longer blocks a new one.
        store.create(a, b).await.unwrap();
        assert_eq!(store.find_sent_by(a).await.unwrap().len(), 2);
        assert_eq!(store.find_resolved_for(b).await.unwrap().len(), 1);
        assert_eq!(store.find_pending_for(b).await.unwrap().len(), 1);
    }
}
