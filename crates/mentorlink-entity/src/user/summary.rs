//! Minimal display record returned by the directory.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use mentorlink_core::types::UserId;

use super::role::UserRole;

/// The display fields the core needs to render a counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Directory identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Mentor or mentee.
    pub role: UserRole,
    /// Avatar URL, when the profile has one.
    pub profile_picture: Option<String>,
}
