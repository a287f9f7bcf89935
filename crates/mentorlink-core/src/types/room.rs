//! Deterministic addressing for two-party conversation rooms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::UserId;
use crate::error::AppError;

/// Length of a hyphenated UUID string.
const ID_LEN: usize = 36;

/// Key of a two-party room: both participant ids, sorted, joined by `-`.
///
/// The same pair always yields the same key regardless of argument order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomKey(String);

impl RoomKey {
    /// Build the key for a pair of users.
    pub fn for_pair(a: UserId, b: UserId) -> Self {
        let (a, b) = (a.to_string(), b.to_string());
        if a <= b {
            Self(format!("{a}-{b}"))
        } else {
            Self(format!("{b}-{a}"))
        }
    }

    /// The two participants, in key order.
    pub fn participants(&self) -> (UserId, UserId) {
        let (first, second) = split(&self.0);
        // Both halves were validated on construction.
        (
            first.parse().unwrap_or_default(),
            second.parse().unwrap_or_default(),
        )
    }

    /// Whether `user` is one of the two participants.
    pub fn includes(&self, user: UserId) -> bool {
        let (a, b) = self.participants();
        a == user || b == user
    }

    /// The participant that is not `user`, if `user` belongs to the room.
    pub fn counterpart(&self, user: UserId) -> Option<UserId> {
        let (a, b) = self.participants();
        if a == user {
            Some(b)
        } else if b == user {
            Some(a)
        } else {
            None
        }
    }

    /// Borrow the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split(raw: &str) -> (&str, &str) {
    (&raw[..ID_LEN], &raw[ID_LEN + 1..])
}

impl FromStr for RoomKey {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::invalid_input(format!("Invalid room id: {raw}"));

        if raw.len() != ID_LEN * 2 + 1 || !raw.is_char_boundary(ID_LEN) {
            return Err(invalid());
        }
        if raw.as_bytes()[ID_LEN] != b'-' {
            return Err(invalid());
        }

        let (first, second) = split(raw);
        let a: UserId = first.parse().map_err(|_| invalid())?;
        let b: UserId = second.parse().map_err(|_| invalid())?;
        if a == b {
            return Err(invalid());
        }

        let key = Self::for_pair(a, b);
        if key.0 != raw {
            return Err(invalid());
        }
        Ok(key)
    }
}

impl TryFrom<String> for RoomKey {
    type Error = AppError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<RoomKey> for String {
    fn from(key: RoomKey) -> Self {
        key.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_order_independent() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(RoomKey::for_pair(a, b), RoomKey::for_pair(b, a));
    }

    #[test]
    fn test_participants_and_counterpart() {
        let a = UserId::new();
        let b = UserId::new();
        let key = RoomKey::for_pair(a, b);

        assert!(key.includes(a));
        assert!(key.includes(b));
        assert!(!key.includes(UserId::new()));
        assert_eq!(key.counterpart(a), Some(b));
        assert_eq!(key.counterpart(b), Some(a));
        assert_eq!(key.counterpart(UserId::new()), None);
    }

    #[test]
    fn test_parse_roundtrip() {
        let key = RoomKey::for_pair(UserId::new(), UserId::new());
        let parsed: RoomKey = key.as_str().parse().expect("valid key");
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        let a = UserId::new();
        let b = UserId::new();
        let (lo, hi) = if a.to_string() < b.to_string() { (a, b) } else { (b, a) };

        assert!("".parse::<RoomKey>().is_err());
        assert!("abc-def".parse::<RoomKey>().is_err());
        assert!(format!("{a}-{a}").parse::<RoomKey>().is_err());
        assert!(format!("{hi}-{lo}").parse::<RoomKey>().is_err());
        assert!(format!("{lo}_{hi}").parse::<RoomKey>().is_err());
        assert!(format!("{lo}-{hi}").parse::<RoomKey>().is_ok());
    }

    #[test]
    fn test_serde_validates() {
        let key = RoomKey::for_pair(UserId::new(), UserId::new());
        let json = serde_json::to_string(&key).expect("serialize");
        let back: RoomKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, key);

        assert!(serde_json::from_str::<RoomKey>("\"room-1\"").is_err());
    }
}
