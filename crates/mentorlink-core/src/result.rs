//! Convenience result type alias for MentorLink.

use crate::error::AppError;

/// A specialized `Result` type for MentorLink operations.
pub type AppResult<T> = Result<T, AppError>;
