//! Connection request record and its populated view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mentorlink_core::types::{RequestId, UserId};

use super::status::RequestStatus;
use crate::user::UserSummary;

/// A pairing request from one user to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The requester.
    pub from_user_id: UserId,
    /// The recipient who decides.
    pub to_user_id: UserId,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
    /// When the recipient decided.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ConnectionRequest {
    /// Build a fresh pending request.
    pub fn pending(from_user_id: UserId, to_user_id: UserId) -> Self {
        Self {
            id: RequestId::new(),
            from_user_id,
            to_user_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }
}

/// A request with both parties' display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    /// The persisted record.
    #[serde(flatten)]
    pub request: ConnectionRequest,
    /// Requester display fields.
    pub from: Option<UserSummary>,
    /// Recipient display fields.
    pub to: Option<UserSummary>,
}
