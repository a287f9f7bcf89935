//! User presence tracking.

pub mod status;
pub mod tracker;

pub use status::PresenceStatus;
pub use tracker::{OnlineUser, PresenceTracker};
