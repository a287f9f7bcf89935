//! Session lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use mentorlink_core::AppError;

/// Lifecycle state of a session.
///
/// `pending → accepted | declined | rejected`, `accepted → completed`, and
/// `pending | accepted → cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Requested by the student, awaiting the mentor.
    Pending,
    /// Mentor agreed to meet.
    Accepted,
    /// Mentor declined.
    Declined,
    /// Mentor rejected.
    Rejected,
    /// The meeting took place.
    Completed,
    /// Withdrawn by either party. Hidden from every listing.
    Cancelled,
}

impl SessionStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses from which no further transition exists.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Declined | Self::Rejected | Self::Completed | Self::Cancelled
        )
    }

    /// Whether the session may still be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    /// Parse a mentor's decision on a pending session.
    pub fn parse_decision(s: &str) -> Result<Self, AppError> {
        match s.parse::<Self>() {
            Ok(status @ (Self::Accepted | Self::Declined | Self::Rejected)) => Ok(status),
            _ => Err(AppError::invalid_status(format!(
                "Invalid status: '{s}'. Expected one of: accepted, declined, rejected"
            ))),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::invalid_status(format!(
                "Invalid session status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorlink_core::ErrorKind;

    #[test]
    fn test_parse_decision_allows_mentor_outcomes_only() {
        for ok in ["accepted", "declined", "rejected"] {
            assert!(SessionStatus::parse_decision(ok).is_ok(), "{ok}");
        }
        for bad in ["pending", "completed", "cancelled", "done"] {
            let err = SessionStatus::parse_decision(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidStatus, "{bad}");
        }
    }

    #[test]
    fn test_cancellable_states() {
        assert!(SessionStatus::Pending.is_cancellable());
        assert!(SessionStatus::Accepted.is_cancellable());
        assert!(!SessionStatus::Completed.is_cancellable());
        assert!(!SessionStatus::Declined.is_cancellable());
        assert!(SessionStatus::Rejected.is_terminal());
        assert!(!SessionStatus::Accepted.is_terminal());
    }
}
