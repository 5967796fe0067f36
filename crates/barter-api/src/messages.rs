use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{info, warn};

use barter_types::api::{ApiResponse, MessagingEndpoints, MessagingStatus, SendMessageRequest};
use barter_types::models::{Message, Session, new_id};
use barter_types::policy::{Action, Resource, authorize};
use barter_types::validate::MAX_DIRECT_MESSAGE_LEN;

use crate::error::ApiError;
use crate::extract::FormOrJson;
use crate::state::AppState;

pub async fn status() -> Json<MessagingStatus> {
    Json(MessagingStatus {
        success: true,
        message: "Messaging API is running",
        endpoints: MessagingEndpoints {
            send: "POST /messages  { receiverId, text }",
            conversation: "GET /messages/conversation/{userId}",
            delete: "DELETE /messages/{id}",
        },
    })
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    FormOrJson(req): FormOrJson<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let receiver_id = req
        .receiver_id()
        .ok_or_else(|| ApiError::bad_request("receiverId is required"))?
        .to_string();

    let text = req.text().to_string();
    if text.is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }
    if text.chars().count() > MAX_DIRECT_MESSAGE_LEN {
        return Err(ApiError::bad_request("Message too long (max 500 characters)"));
    }

    let now = Utc::now();
    let message = Message {
        message_id: new_id(),
        sender_id: session.user.user_id.clone(),
        receiver_id,
        text,
        deleted: false,
        created_at: now,
        updated_at: now,
    };

    let stored = message.clone();
    state.db(move |db| db.insert_message(&stored)).await?;

    info!("User {} messaged {}", message.sender_id, message.receiver_id);
    state.audit("MESSAGE_SEND", Some(message.sender_id.clone()));

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Message sent", message)),
    ))
}

pub async fn conversation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(other): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let me = session.user.user_id.clone();
    let messages = state.db(move |db| db.conversation(&me, &other)).await?;
    Ok(Json(ApiResponse::ok("Conversation loaded", messages)))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let lookup = id.clone();
    let message = state
        .db(move |db| db.get_message(&lookup))
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    if let Err(denied) = authorize(&session.user.user_id, Action::DeleteMessage, Resource::Message(&message)) {
        warn!("User {} attempted to delete message {}", session.user.user_id, id);
        return Err(ApiError::forbidden(denied.message));
    }

    state
        .db(move |db| db.soft_delete_message(&id, Utc::now()))
        .await?;

    state.audit("MESSAGE_DELETE", Some(session.user.user_id.clone()));
    Ok(Json(ApiResponse::message("Message deleted")))
}
