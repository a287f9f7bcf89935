//! Presence tracker: which users are online, and since when.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use mentorlink_core::types::UserId;
use mentorlink_entity::user::UserRole;

use super::status::PresenceStatus;
use crate::message::types::{OutboundEvent, UserStatus};

/// Tracks the set of online users.
///
/// The connection manager drives every transition while holding its
/// lifecycle lock; the tracker itself only records the outcome.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    online: DashMap<UserId, OnlineUser>,
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as online and build the announcement.
    pub fn set_online(&self, user_id: UserId, role: UserRole, display_name: &str) -> OutboundEvent {
        self.online.insert(
            user_id,
            OnlineUser {
                user_id,
                display_name: display_name.to_string(),
                role,
                since: Utc::now(),
            },
        );
        status_event(user_id, PresenceStatus::Online)
    }

    /// Mark a user as offline and build the announcement.
    pub fn set_offline(&self, user_id: UserId) -> OutboundEvent {
        self.online.remove(&user_id);
        status_event(user_id, PresenceStatus::Offline)
    }

    /// Get a user's current status
    pub fn status(&self, user_id: UserId) -> PresenceStatus {
        if self.is_online(user_id) {
            PresenceStatus::Online
        } else {
            PresenceStatus::Offline
        }
    }

    /// Check if a user is online
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.online.contains_key(&user_id)
    }

    /// All online users, longest-connected first.
    pub fn all_online(&self) -> Vec<OnlineUser> {
        let mut users: Vec<OnlineUser> = self.online.iter().map(|r| r.value().clone()).collect();
        users.sort_by(|a, b| a.since.cmp(&b.since).then_with(|| a.user_id.cmp(&b.user_id)));
        users
    }

    /// Get online user count
    pub fn online_count(&self) -> usize {
        self.online.len()
    }
}

fn status_event(user_id: UserId, status: PresenceStatus) -> OutboundEvent {
    OutboundEvent::UserStatus(UserStatus { user_id, status })
}

/// Online user info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    /// User ID
    pub user_id: UserId,
    /// Display name from the identity token
    pub display_name: String,
    /// Mentor or mentee
    pub role: UserRole,
    /// When the user's first live connection opened
    pub since: DateTime<Utc>,
}
