//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use mentorlink_auth::jwt::JwtDecoder;
use mentorlink_core::config::AppConfig;
use mentorlink_database::Stores;
use mentorlink_realtime::RealtimeEngine;
use mentorlink_service::{ConversationService, RequestService, SessionService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Backing stores (PostgreSQL or in-memory)
    pub stores: Stores,
    /// JWT decoder for bearer tokens
    pub jwt_decoder: Arc<JwtDecoder>,
    /// WebSocket notification bus
    pub realtime: Arc<RealtimeEngine>,
    /// Connection Request Engine
    pub request_service: Arc<RequestService>,
    /// Session Engine
    pub session_service: Arc<SessionService>,
    /// Conversation Store
    pub conversation_service: Arc<ConversationService>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}
