//! Connection Request Engine.

pub mod service;

pub use service::{RequestService, SendRequest};
