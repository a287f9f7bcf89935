//! # mentorlink-core
//!
//! Core crate for MentorLink. Contains configuration schemas, typed
//! identifiers, the two-party room key, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MentorLink crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
