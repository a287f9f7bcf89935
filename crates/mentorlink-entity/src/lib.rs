//! # mentorlink-entity
//!
//! Domain records for MentorLink. Every struct in this crate represents a
//! database table row, a value object, or a read view that pairs a row with
//! display fields resolved from the user directory. Records only store user
//! ids; display fields never live in the persisted shape.

pub mod message;
pub mod request;
pub mod session;
pub mod user;
