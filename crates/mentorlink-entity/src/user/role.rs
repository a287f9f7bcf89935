//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use mentorlink_core::AppError;

/// The two sides of a mentoring relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Offers guidance and receives connection and session requests.
    Mentor,
    /// Seeks guidance; sends requests and books sessions.
    Mentee,
}

impl UserRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::Mentee => "mentee",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mentor" => Ok(Self::Mentor),
            "mentee" | "student" => Ok(Self::Mentee),
            _ => Err(AppError::invalid_input(format!(
                "Invalid user role: '{s}'. Expected one of: mentor, mentee"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!("Mentor".parse::<UserRole>().unwrap(), UserRole::Mentor);
        assert_eq!("student".parse::<UserRole>().unwrap(), UserRole::Mentee);
        assert!("admin".parse::<UserRole>().is_err());
    }
}
