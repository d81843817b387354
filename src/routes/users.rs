// SPDX-License-Identifier: MIT

//! User profile and presence routes.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{ApiResponse, User};
use crate::services::notify;
use crate::time_utils::{is_within_minutes, now_rfc3339};
use crate::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Window within which a reported `last_seen` counts as online.
const ONLINE_WINDOW_MINUTES: i64 = 2;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/user/create", post(create_user))
        .route("/api/v1/user/profile", get(get_profile).put(update_profile))
        .route("/api/v1/users/status", put(update_my_status))
        .route("/api/v1/users/{user_id}", get(get_user))
        .route("/api/v1/users/{user_id}/status", get(get_user_status))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub uid: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusForm {
    pub is_online: bool,
    #[serde(default)]
    pub typing_in_chat: Option<String>,
}

/// Register a new user after Firebase signup.
#[utoipa::path(
    post,
    path = "/api/v1/user/create",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = ApiResponse),
        (status = 403, description = "UID does not match the authenticated user")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if payload.uid != auth.uid {
        return Err(AppError::Forbidden(
            "Cannot create a profile for another user".to_string(),
        ));
    }

    if let Some(existing) = state.db.get_user(&payload.uid).await? {
        return Ok(Json(ApiResponse::ok(
            "User already exists",
            serde_json::to_value(&existing)?,
        )));
    }

    let now = now_rfc3339();
    let user = User {
        uid: payload.uid,
        email: payload.email,
        full_name: payload.full_name,
        email_verified: payload.email_verified,
        photo_url: payload.photo_url,
        rating: 0.0,
        is_active: true,
        account_type: payload
            .account_type
            .unwrap_or_else(|| "individual".to_string()),
        created_at: now.clone(),
        updated_at: now,
        phone_number: payload.phone_number.unwrap_or_default(),
        address: payload.address.unwrap_or_else(|| "not available".to_string()),
        bio: payload.bio.unwrap_or_else(|| "not available".to_string()),
        is_admin: false,
        last_seen: None,
        is_online: false,
        typing_in_chat: None,
    };
    state.db.upsert_user(&user).await?;

    notify::create_notification(
        &state.db,
        "New User Registered",
        &format!("{} ({}) just joined ShareCare", user.full_name, user.email),
        "user_registered",
        vec![state.config.admin_email.clone()],
        true,
    )
    .await;

    if let Err(e) = state.email.send_welcome(&user.email, &user.full_name).await {
        tracing::warn!(uid = %user.uid, "Failed to send welcome email: {}", e);
    }

    Ok(Json(ApiResponse::ok(
        "User created successfully",
        serde_json::to_value(&user)?,
    )))
}

/// Fetch the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "User profile", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let user = state
        .db
        .get_user(&auth.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "Profile retrieved successfully",
        serde_json::to_value(&user)?,
    )))
}

/// Update the authenticated user's profile.
#[utoipa::path(
    put,
    path = "/api/v1/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse>> {
    let mut user = state
        .db
        .get_user(&auth.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(full_name) = payload.full_name {
        user.full_name = full_name;
    }
    if let Some(photo_url) = payload.photo_url {
        user.photo_url = Some(photo_url);
    }
    if let Some(account_type) = payload.account_type {
        user.account_type = account_type;
    }
    if let Some(phone_number) = payload.phone_number {
        user.phone_number = phone_number;
    }
    if let Some(address) = payload.address {
        user.address = address;
    }
    if let Some(bio) = payload.bio {
        user.bio = bio;
    }
    user.updated_at = now_rfc3339();

    state.db.upsert_user(&user).await?;

    Ok(Json(ApiResponse::ok(
        "Profile updated successfully",
        serde_json::to_value(&user)?,
    )))
}

/// Public profile of any user, with their donation statistics.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile with statistics", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let donations_count = state.db.get_items_by_donor(&user_id).await?.len();
    let reservations = state.db.get_reservations_for_user(&user_id).await?;
    let pickups_count = reservations
        .iter()
        .filter(|r| r.status == "picked_up")
        .count();

    let mut data = serde_json::to_value(&user)?;
    data["stats"] = json!({
        "donations_count": donations_count,
        "reservations_count": reservations.len(),
        "pickups_count": pickups_count,
    });

    Ok(Json(ApiResponse::ok("User retrieved successfully", data)))
}

/// Online presence of a user, derived from their last reported activity.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/status",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User presence", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let is_online = user
        .last_seen
        .as_deref()
        .is_some_and(|seen| is_within_minutes(seen, ONLINE_WINDOW_MINUTES));

    if user.is_online != is_online {
        user.is_online = is_online;
        state.db.upsert_user(&user).await?;
    }

    Ok(Json(ApiResponse::ok(
        "Status retrieved successfully",
        json!({
            "is_online": is_online,
            "last_seen": user.last_seen,
            "typing_in_chat": user.typing_in_chat,
        }),
    )))
}

/// Report the authenticated user's presence and typing state.
#[utoipa::path(
    put,
    path = "/api/v1/users/status",
    responses(
        (status = 200, description = "Status updated", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_my_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Form(form): Form<UpdateStatusForm>,
) -> Result<Json<ApiResponse>> {
    let mut user = state
        .db
        .get_user(&auth.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user.is_online = form.is_online;
    user.typing_in_chat = form.typing_in_chat;
    user.last_seen = Some(now_rfc3339());
    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    Ok(Json(ApiResponse::ok_empty("Status updated successfully")))
}
