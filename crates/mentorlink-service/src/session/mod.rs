//! Session Engine.

pub mod service;

pub use service::{CreateSessionRequest, SessionService};
