//! Core type definitions used across the MentorLink workspace.

pub mod id;
pub mod room;

pub use id::*;
pub use room::RoomKey;
