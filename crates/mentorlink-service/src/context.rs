//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mentorlink_core::error::AppError;
use mentorlink_core::types::UserId;
use mentorlink_entity::user::UserRole;

/// Context for the current authenticated command.
///
/// Built from verified token claims by the HTTP extractor or the bus
/// authenticator and passed into every service method so each operation
/// knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// Display name from the token.
    pub display_name: String,
    /// When the command was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            display_name: display_name.into(),
            request_time: Utc::now(),
        }
    }

    /// Fails with `FORBIDDEN` unless the caller is `user`.
    pub fn ensure_is(&self, user: UserId, action: &str) -> Result<(), AppError> {
        if self.user_id == user {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Only user {user} may {action}"
            )))
        }
    }

    /// Fails with `FORBIDDEN` unless the caller is one of `users`.
    pub fn ensure_one_of(&self, users: &[UserId], action: &str) -> Result<(), AppError> {
        if users.contains(&self.user_id) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Only a participant may {action}"
            )))
        }
    }
}
