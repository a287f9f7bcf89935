//! Typed path parameter helpers.

use std::str::FromStr;

use mentorlink_core::error::AppError;
use mentorlink_core::types::parse_required;

/// Parses a typed id from a path segment, naming the segment on failure.
pub fn parse_id<T: FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    parse_required(name, Some(raw))
}
