//! PostgreSQL implementations of the store traits.

pub mod message;
pub mod request;
pub mod session;
pub mod user;

pub use message::MessageRepository;
pub use request::ConnectionRequestRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use mentorlink_core::error::{AppError, ErrorKind};

/// Map a sqlx failure to `STORAGE_UNAVAILABLE` with context.
pub(crate) fn storage_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::StorageUnavailable, context, e)
}

/// Whether a sqlx failure is a unique-index violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
