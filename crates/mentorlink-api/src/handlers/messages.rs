//! Conversation handlers.

use axum::Json;
use axum::extract::{Path, State};

use mentorlink_core::types::{MessageId, UserId};
use mentorlink_entity::message::{ConversationSummary, MessageView};
use mentorlink_entity::user::UserSummary;
use mentorlink_service::PostMessage;

use crate::dto::response::{ApiResponse, CountResponse, Created};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::extractors::path::parse_id;
use crate::state::AppState;

/// POST /api/messages
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<PostMessage>,
) -> ApiResult<Created<MessageView>> {
    let view = state.conversation_service.post_message(&auth, req).await?;
    Ok(Created(view))
}

/// GET /api/messages/{user_id}/{recipient_id}
///
/// Opening the thread as `user_id` marks the other side's messages read.
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, recipient_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<Vec<MessageView>>>> {
    let user_a: UserId = parse_id("userId", &user_id)?;
    let user_b: UserId = parse_id("recipientId", &recipient_id)?;
    let thread = state
        .conversation_service
        .list_messages(&auth, user_a, user_b)
        .await?;
    Ok(Json(ApiResponse::ok(thread)))
}

/// PATCH /api/messages/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageView>>> {
    let id: MessageId = parse_id("id", &id)?;
    let view = state.conversation_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/messages/unread/{user_id}/{recipient_id}
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, recipient_id)): Path<(String, String)>,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    let user_a: UserId = parse_id("userId", &user_id)?;
    let user_b: UserId = parse_id("recipientId", &recipient_id)?;
    let count = state
        .conversation_service
        .unread_count(&auth, user_a, user_b)
        .await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// GET /api/messages/conversations/{user_id}
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<ConversationSummary>>>> {
    let user_id: UserId = parse_id("userId", &user_id)?;
    let summaries = state
        .conversation_service
        .list_conversations(&auth, user_id)
        .await?;
    Ok(Json(ApiResponse::ok(summaries)))
}

/// GET /api/messages/users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserSummary>>> {
    let user_id: UserId = parse_id("userId", &user_id)?;
    let user = state.conversation_service.find_user(user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}
