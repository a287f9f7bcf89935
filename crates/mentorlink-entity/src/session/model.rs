//! Session record, creation input, and populated view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mentorlink_core::types::{SessionId, UserId};

use super::status::SessionStatus;
use crate::user::UserSummary;

/// A meeting requested by a student with a mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The requesting student.
    pub student_id: UserId,
    /// The mentor asked to meet.
    pub mentor_id: UserId,
    /// Short subject line.
    pub title: String,
    /// Optional agenda.
    pub description: Option<String>,
    /// When the meeting is planned.
    pub scheduled_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// Feedback captured on completion.
    pub feedback: Option<serde_json::Value>,
    /// When the session was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the session was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Whether `user` is the student or the mentor.
    pub fn involves(&self, user: UserId) -> bool {
        self.student_id == user || self.mentor_id == user
    }

    /// Both participants, student first.
    pub fn participants(&self) -> [UserId; 2] {
        [self.student_id, self.mentor_id]
    }
}

/// Validated input for creating a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// The requesting student.
    pub student_id: UserId,
    /// The mentor asked to meet.
    pub mentor_id: UserId,
    /// Short subject line.
    pub title: String,
    /// Optional agenda.
    pub description: Option<String>,
    /// When the meeting is planned.
    pub scheduled_at: DateTime<Utc>,
}

impl NewSession {
    /// Materialise the pending record for this input.
    pub fn into_pending(self) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::new(),
            student_id: self.student_id,
            mentor_id: self.mentor_id,
            title: self.title,
            description: self.description,
            scheduled_at: self.scheduled_at,
            status: SessionStatus::Pending,
            feedback: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A session with both parties' display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// The persisted record.
    #[serde(flatten)]
    pub session: Session,
    /// Student display fields.
    pub student: Option<UserSummary>,
    /// Mentor display fields.
    pub mentor: Option<UserSummary>,
}
