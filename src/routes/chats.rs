// SPDX-License-Identifier: MIT

//! Chat routes between donors and requesters.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{ApiResponse, Chat, Message};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/chats", get(list_chats))
        .route(
            "/api/v1/chats/{chat_id}/messages",
            get(get_messages).post(send_message),
        )
        .route(
            "/api/v1/chats/{chat_id}/messages/image",
            post(send_image_message),
        )
        .route(
            "/api/v1/chats/{chat_id}/messages/read",
            put(mark_messages_read),
        )
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageForm {
    pub message: String,
}

/// Load a chat and fail unless the caller is one of its two participants.
async fn load_chat_for_participant(
    state: &AppState,
    chat_id: &str,
    uid: &str,
) -> Result<Chat> {
    let chat = state
        .db
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

    if chat.donor_id != uid && chat.requester_id != uid {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    Ok(chat)
}

/// All chats for the caller, with item, unread count, latest message and the
/// other participant joined in. Sorted by most recent activity.
#[utoipa::path(
    get,
    path = "/api/v1/chats",
    responses((status = 200, description = "Chat list", body = ApiResponse)),
    tag = "chats",
    security(("bearer_auth" = []))
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let chats = state.db.get_chats_for_user(&auth.uid).await?;

    let mut joined = Vec::with_capacity(chats.len());
    for chat in &chats {
        let mut entry = serde_json::to_value(chat)?;

        if let Some(item) = state.db.get_item(&chat.item_id).await? {
            entry["item"] = serde_json::to_value(&item)?;
        }

        let unread = state.db.get_unread_messages(&chat.id, &auth.uid).await?;
        entry["unread_count"] = json!(unread.len());

        let messages = state.db.get_messages_for_chat(&chat.id).await?;
        if let Some(last) = messages.last() {
            entry["last_message"] = json!(last.message);
            entry["last_message_at"] = json!(last.created_at);
        }

        let other_uid = if chat.requester_id == auth.uid {
            &chat.donor_id
        } else {
            &chat.requester_id
        };
        if let Some(other) = state.db.get_user(other_uid).await? {
            entry["other_user"] = serde_json::to_value(&other)?;
        }

        joined.push(entry);
    }

    joined.sort_by(|a, b| {
        let a_key = a["last_message_at"].as_str().unwrap_or("");
        let b_key = b["last_message_at"].as_str().unwrap_or("");
        b_key.cmp(a_key)
    });

    Ok(Json(ApiResponse::ok(
        "Chats retrieved successfully",
        json!({ "chats": joined }),
    )))
}

/// Message history for a chat, oldest first. Participants only.
#[utoipa::path(
    get,
    path = "/api/v1/chats/{chat_id}/messages",
    params(("chat_id" = String, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Messages", body = ApiResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    ),
    tag = "chats",
    security(("bearer_auth" = []))
)]
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    load_chat_for_participant(&state, &chat_id, &auth.uid).await?;

    let messages = state.db.get_messages_for_chat(&chat_id).await?;

    Ok(Json(ApiResponse::ok(
        "Messages retrieved successfully",
        json!({ "messages": serde_json::to_value(&messages)? }),
    )))
}

/// Send a text message in a chat.
#[utoipa::path(
    post,
    path = "/api/v1/chats/{chat_id}/messages",
    params(("chat_id" = String, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Message sent", body = ApiResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    ),
    tag = "chats",
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Form(form): Form<SendMessageForm>,
) -> Result<Json<ApiResponse>> {
    let mut chat = load_chat_for_participant(&state, &chat_id, &auth.uid).await?;

    let mut message = Message {
        id: String::new(),
        chat_id: chat_id.clone(),
        sender_id: auth.uid.clone(),
        message: form.message.clone(),
        image_url: None,
        created_at: now_rfc3339(),
        read: false,
    };
    state.db.create_message(&mut message).await?;

    chat.last_message_at = now_rfc3339();
    chat.last_message = Some(form.message);
    state.db.update_chat(&chat).await?;

    Ok(Json(ApiResponse::ok(
        "Message sent successfully",
        serde_json::to_value(&message)?,
    )))
}

/// Send an image message. The image lands in object storage and the message
/// carries its URL with an empty text body.
#[utoipa::path(
    post,
    path = "/api/v1/chats/{chat_id}/messages/image",
    params(("chat_id" = String, Path, description = "Chat ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image sent", body = ApiResponse),
        (status = 400, description = "No image or unsupported type"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    ),
    tag = "chats",
    security(("bearer_auth" = []))
)]
pub async fn send_image_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse>> {
    let mut chat = load_chat_for_participant(&state, &chat_id, &auth.uid).await?;

    let mut image_url = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("image.jpg").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;

        image_url = Some(
            state
                .storage
                .upload_image(&filename, &content_type, &data)
                .await?,
        );
        break;
    }

    let image_url = image_url.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;

    let mut message = Message {
        id: String::new(),
        chat_id: chat_id.clone(),
        sender_id: auth.uid.clone(),
        message: String::new(),
        image_url: Some(image_url),
        created_at: now_rfc3339(),
        read: false,
    };
    state.db.create_message(&mut message).await?;

    chat.last_message_at = now_rfc3339();
    chat.last_message = Some("📷 Image".to_string());
    state.db.update_chat(&chat).await?;

    Ok(Json(ApiResponse::ok(
        "Image sent successfully",
        serde_json::to_value(&message)?,
    )))
}

/// Mark every unread message from the other participant as read.
#[utoipa::path(
    put,
    path = "/api/v1/chats/{chat_id}/messages/read",
    params(("chat_id" = String, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Messages marked as read", body = ApiResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Chat not found")
    ),
    tag = "chats",
    security(("bearer_auth" = []))
)]
pub async fn mark_messages_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    load_chat_for_participant(&state, &chat_id, &auth.uid).await?;

    let unread = state.db.get_unread_messages(&chat_id, &auth.uid).await?;
    for mut message in unread {
        message.read = true;
        state.db.update_message(&message).await?;
    }

    Ok(Json(ApiResponse::ok_empty("Messages marked as read")))
}
