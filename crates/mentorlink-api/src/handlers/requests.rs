//! Connection request handlers.

use axum::Json;
use axum::extract::{Path, State};

use mentorlink_core::types::{RequestId, UserId};
use mentorlink_entity::request::RequestView;
use mentorlink_service::SendRequest;

use crate::dto::request::StatusBody;
use crate::dto::response::{ApiResponse, Created};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// POST /api/requests
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendRequest>,
) -> ApiResult<Created<RequestView>> {
    let view = state.request_service.send_request(&auth, req).await?;
    Ok(Created(view))
}

/// PUT|PATCH /api/requests/{id}
pub async fn respond_to_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<ApiResponse<RequestView>>> {
    let id: RequestId = parse_id("id", &id)?;
    let status = body.status.unwrap_or_default();
    let view = state
        .request_service
        .respond_to_request(&auth, id, &status)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/requests/{id}/accept
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<RequestView>>> {
    let id: RequestId = parse_id("id", &id)?;
    let view = state.request_service.accept(&auth, id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/requests/{id}/reject
pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<RequestView>>> {
    let id: RequestId = parse_id("id", &id)?;
    let view = state.request_service.reject(&auth, id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/requests/{id}: requests sent by the user
pub async fn list_sent(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<RequestView>>>> {
    let user_id: UserId = parse_id("userId", &user_id)?;
    let views = state.request_service.list_requests_for(&auth, user_id).await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// GET /api/requests/mentor/{mentor_id}
pub async fn list_mentor_pending(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(mentor_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<RequestView>>>> {
    let mentor_id: UserId = parse_id("mentorId", &mentor_id)?;
    let views = state
        .request_service
        .list_mentor_pending(&auth, mentor_id)
        .await?;
    Ok(Json(ApiResponse::ok(views)))
}

/// GET /api/requests/resolved/{mentor_id}
pub async fn list_resolved(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(mentor_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<RequestView>>>> {
    let mentor_id: UserId = parse_id("mentorId", &mentor_id)?;
    let views = state.request_service.list_resolved(&auth, mentor_id).await?;
    Ok(Json(ApiResponse::ok(views)))
}
