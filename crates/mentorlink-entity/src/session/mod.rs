//! Scheduled mentoring sessions.

pub mod model;
pub mod schedule;
pub mod status;

pub use model::{NewSession, Session, SessionView};
pub use schedule::SessionBuckets;
pub use status::SessionStatus;
