//! Two-party chat rooms.

pub mod membership;
pub mod registry;

pub use registry::RoomRegistry;
