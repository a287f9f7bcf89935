//! Connection request lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use mentorlink_core::AppError;

/// Lifecycle state of a connection request.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting the recipient's decision.
    Pending,
    /// Recipient accepted.
    Accepted,
    /// Recipient rejected.
    Rejected,
}

impl RequestStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the request has been decided.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Parse a recipient's decision. Only `accepted` and `rejected` qualify.
    pub fn parse_decision(s: &str) -> Result<Self, AppError> {
        match s.parse::<Self>() {
            Ok(status) if status.is_resolved() => Ok(status),
            _ => Err(AppError::invalid_status(format!(
                "Invalid status: '{s}'. Expected one of: accepted, rejected"
            ))),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::invalid_status(format!(
                "Invalid request status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorlink_core::ErrorKind;

    #[test]
    fn test_parse_decision() {
        assert_eq!(
            RequestStatus::parse_decision("accepted").unwrap(),
            RequestStatus::Accepted
        );
        assert_eq!(
            RequestStatus::parse_decision("REJECTED").unwrap(),
            RequestStatus::Rejected
        );

        let pending = RequestStatus::parse_decision("pending").unwrap_err();
        assert_eq!(pending.kind, ErrorKind::InvalidStatus);

        let unknown = RequestStatus::parse_decision("maybe").unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::InvalidStatus);
    }
}
