// SPDX-License-Identifier: MIT

//! Authentication routes: Firebase token verification and admin login.

use crate::middleware::create_admin_jwt;
use crate::models::ApiResponse;
use crate::error::{AppError, Result};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/auth/verify", post(verify_token))
        .route("/api/v1/auth/admin/login", post(admin_login))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyTokenRequest {
    #[validate(length(min = 1))]
    pub uid: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Verify a Firebase-authenticated user and return their profile.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token verified", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn verify_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state
        .db
        .get_user(&payload.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Login notification email is best effort
    if let Err(e) = state
        .email
        .send_login_notification(&user.email, &user.full_name)
        .await
    {
        tracing::warn!(uid = %user.uid, "Failed to send login notification: {}", e);
    }

    Ok(Json(ApiResponse::ok(
        "Token verified successfully",
        json!({
            "user": serde_json::to_value(&user)?,
            "verified": true,
            "is_admin": false,
        }),
    )))
}

/// Admin login with email and password, returning a session JWT.
#[utoipa::path(
    post,
    path = "/api/v1/auth/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if payload.email != state.config.admin_email
        || payload.password != state.config.admin_password
    {
        tracing::warn!(email = %payload.email, "Rejected admin login attempt");
        return Err(AppError::Unauthorized);
    }

    let token = create_admin_jwt(&state.config.admin_email, &state.config.jwt_signing_key)?;
    let now = now_rfc3339();

    Ok(Json(ApiResponse::ok(
        "Admin login successful",
        json!({
            "user": {
                "uid": "admin",
                "email": state.config.admin_email,
                "full_name": "ShareCare Admin",
                "isAdmin": true,
                "account_type": "admin",
                "created_at": now,
            },
            "token": token,
        }),
    )))
}
