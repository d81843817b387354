// SPDX-License-Identifier: MIT

//! File upload route.

use crate::error::{AppError, Result};
use crate::models::ApiResponse;
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/upload", post(upload_file))
}

/// Upload an image and return its public URL.
#[utoipa::path(
    post,
    path = "/api/v1/upload",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = ApiResponse),
        (status = 400, description = "No file provided or unsupported type")
    ),
    tag = "uploads",
    security(("bearer_auth" = []))
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.jpg").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

        let url = state
            .storage
            .upload_image(&filename, &content_type, &data)
            .await?;

        return Ok(Json(ApiResponse::ok(
            "File uploaded successfully",
            json!({ "url": url }),
        )));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}
