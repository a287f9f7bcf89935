//! Presence query handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, PresenceResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence
pub async fn online_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<PresenceResponse>> {
    let online_user_ids: Vec<_> = state
        .realtime
        .connections
        .online_users()
        .into_iter()
        .map(|user| user.user_id)
        .collect();

    Json(ApiResponse::ok(PresenceResponse {
        count: online_user_ids.len(),
        online_user_ids,
    }))
}
