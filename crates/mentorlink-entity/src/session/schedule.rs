//! Partitioning a user's sessions for the schedule view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::SessionView;
use super::status::SessionStatus;

/// A user's sessions split into disjoint buckets.
///
/// Every non-cancelled session lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBuckets {
    /// Awaiting the mentor's decision.
    pub pending: Vec<SessionView>,
    /// Accepted and scheduled after `now`.
    pub upcoming: Vec<SessionView>,
    /// Completed, or accepted with a start time that has passed.
    pub past: Vec<SessionView>,
    /// Declined or rejected by the mentor.
    pub declined: Vec<SessionView>,
}

impl SessionBuckets {
    /// Split `sessions` relative to `now`, preserving input order.
    pub fn partition(sessions: Vec<SessionView>, now: DateTime<Utc>) -> Self {
        let mut buckets = Self::default();
        for view in sessions {
            match view.session.status {
                SessionStatus::Pending => buckets.pending.push(view),
                SessionStatus::Accepted if view.session.scheduled_at > now => {
                    buckets.upcoming.push(view)
                }
                SessionStatus::Accepted | SessionStatus::Completed => buckets.past.push(view),
                SessionStatus::Declined | SessionStatus::Rejected => buckets.declined.push(view),
                SessionStatus::Cancelled => {}
            }
        }
        buckets
    }

    /// Total number of sessions across all buckets.
    pub fn len(&self) -> usize {
        self.pending.len() + self.upcoming.len() + self.past.len() + self.declined.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
