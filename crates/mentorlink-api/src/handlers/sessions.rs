//! Session handlers.

use axum::Json;
use axum::extract::{Path, State};

use mentorlink_core::types::{SessionId, UserId};
use mentorlink_entity::session::{SessionBuckets, SessionView};
use mentorlink_service::CreateSessionRequest;

use crate::dto::request::{CompleteSessionBody, StatusBody};
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// POST /api/sessions/create
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Created<SessionView>> {
    let view = state.session_service.create_session(&auth, req).await?;
    Ok(Created(view))
}

/// PATCH /api/sessions/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let id: SessionId = parse_id("id", &id)?;
    let status = body.status.unwrap_or_default();
    let view = state
        .session_service
        .update_status(&auth, id, &status)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// PATCH /api/sessions/{id}/complete
pub async fn complete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CompleteSessionBody>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let id: SessionId = parse_id("id", &id)?;
    let view = state
        .session_service
        .complete_session(&auth, id, body.feedback)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// DELETE /api/sessions/{id}
pub async fn cancel_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let id: SessionId = parse_id("id", &id)?;
    let view = state.session_service.cancel_session(&auth, id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/sessions/user/{user_id}
pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<SessionBuckets>>> {
    let user_id: UserId = parse_id("userId", &user_id)?;
    let buckets = state.session_service.list_for_user(&auth, user_id).await?;
    Ok(Json(ApiResponse::ok(buckets)))
}

/// GET /api/sessions/resolved/{user_id}
pub async fn list_resolved(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<SessionView>>>> {
    let user_id: UserId = parse_id("userId", &user_id)?;
    let views = state.session_service.list_resolved(&auth, user_id).await?;
    Ok(Json(ApiResponse::ok(views)))
}
