//! Route definitions for the MentorLink HTTP API.
//!
//! All REST routes are organized by domain and mounted under `/api`; the
//! bus handshake lives at `/ws`. Sibling routes share parameter names
//! (`{id}`) because the path matcher requires it.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(request_routes())
        .merge(session_routes())
        .merge(message_routes())
        .merge(presence_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Connection Request Engine
fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(handlers::requests::send_request))
        .route(
            "/requests/{id}",
            get(handlers::requests::list_sent)
                .put(handlers::requests::respond_to_request)
                .patch(handlers::requests::respond_to_request),
        )
        .route(
            "/requests/{id}/accept",
            post(handlers::requests::accept_request),
        )
        .route(
            "/requests/{id}/reject",
            post(handlers::requests::reject_request),
        )
        .route(
            "/requests/mentor/{id}",
            get(handlers::requests::list_mentor_pending),
        )
        .route(
            "/requests/resolved/{id}",
            get(handlers::requests::list_resolved),
        )
}

/// Session Engine
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/create", post(handlers::sessions::create_session))
        .route(
            "/sessions/{id}",
            delete(handlers::sessions::cancel_session),
        )
        .route(
            "/sessions/{id}/status",
            patch(handlers::sessions::update_status),
        )
        .route(
            "/sessions/{id}/complete",
            patch(handlers::sessions::complete_session),
        )
        .route("/sessions/user/{id}", get(handlers::sessions::list_for_user))
        .route(
            "/sessions/resolved/{id}",
            get(handlers::sessions::list_resolved),
        )
}

/// Conversation Store
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(handlers::messages::post_message))
        .route(
            "/messages/{id}/{recipient_id}",
            get(handlers::messages::list_messages),
        )
        .route("/messages/{id}/read", patch(handlers::messages::mark_read))
        .route(
            "/messages/unread/{id}/{recipient_id}",
            get(handlers::messages::unread_count),
        )
        .route(
            "/messages/conversations/{id}",
            get(handlers::messages::list_conversations),
        )
        .route("/messages/users/{id}", get(handlers::messages::get_user))
}

/// Presence query
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence", get(handlers::presence::online_users))
}

/// Health checks (no auth)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
