//! # mentorlink-api
//!
//! HTTP API layer for MentorLink built on Axum.
//!
//! Provides the REST endpoints for requests, sessions, and messages, the
//! WebSocket upgrade for the notification bus, middleware (CORS, request
//! logging), the bearer-token extractor, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use state::AppState;
