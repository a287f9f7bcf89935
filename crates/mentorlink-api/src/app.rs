//! Application builder: wires stores, engines, and the bus into an Axum app.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tracing::info;

use mentorlink_auth::jwt::JwtDecoder;
use mentorlink_core::config::AppConfig;
use mentorlink_database::Stores;
use mentorlink_realtime::RealtimeEngine;
use mentorlink_service::{
    ConversationService, DisplayResolver, EventPublisher, RequestService, SessionService,
};

use crate::router::build_router;
use crate::state::AppState;

/// Constructs every engine over the given stores.
///
/// The bus needs the conversation store to persist `send_message`, and the
/// request and session engines publish through the bus, so construction
/// runs in that order.
pub fn build_state(config: AppConfig, stores: Stores) -> AppState {
    let resolver = DisplayResolver::new(stores.directory.clone());
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    let conversation_service = Arc::new(ConversationService::new(
        stores.messages.clone(),
        resolver.clone(),
        config.conversation.clone(),
    ));

    let realtime = Arc::new(RealtimeEngine::new(
        config.realtime.clone(),
        jwt_decoder.clone(),
        conversation_service.clone(),
    ));
    let publisher: Arc<dyn EventPublisher> = realtime.event_bridge.clone();

    let request_service = Arc::new(RequestService::new(
        stores.requests.clone(),
        resolver.clone(),
        publisher.clone(),
    ));
    let session_service = Arc::new(SessionService::new(
        stores.sessions.clone(),
        resolver,
        publisher,
    ));

    info!("Engines initialized");

    AppState {
        config: Arc::new(config),
        stores,
        jwt_decoder,
        realtime,
        request_service,
        session_service,
        conversation_service,
        started_at: Instant::now(),
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
