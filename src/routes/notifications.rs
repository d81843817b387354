// SPDX-License-Identifier: MIT

//! User notification feed routes.

use crate::db::collections;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{paginate, ApiResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::IntoParams;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/notifications", get(list_notifications))
        .route("/api/v1/notifications/read-all", put(mark_all_read))
        .route(
            "/api/v1/notifications/{notification_id}",
            get(get_notification).delete(delete_notification),
        )
        .route(
            "/api/v1/notifications/{notification_id}/read",
            put(mark_read),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

/// Paginated notification feed for the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationsQuery),
    responses((status = 200, description = "Notification feed", body = ApiResponse)),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<ApiResponse>> {
    let notifications = state.db.notifications_for_user(&auth.uid).await?;
    let unread_count = notifications
        .iter()
        .filter(|n| !n.is_read_by(&auth.uid))
        .count();

    let (page_items, total, total_pages) = paginate(&notifications, query.page, query.limit);

    let mut entries = Vec::with_capacity(page_items.len());
    for notification in &page_items {
        let mut entry = serde_json::to_value(notification)?;
        entry["read"] = json!(notification.is_read_by(&auth.uid));
        entries.push(entry);
    }

    Ok(Json(ApiResponse::ok(
        "Notifications retrieved successfully",
        json!({
            "notifications": entries,
            "unread_count": unread_count,
            "total": total,
            "page": query.page,
            "limit": query.limit,
            "total_pages": total_pages,
        }),
    )))
}

/// Fetch one notification. Targeted notifications are only visible to their
/// recipients.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification detail", body = ApiResponse),
        (status = 403, description = "Not a recipient"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let notification = state
        .db
        .get_notification(collections::NOTIFICATIONS, &notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if !notification.visible_to(&auth.uid) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let mut data = serde_json::to_value(&notification)?;
    data["read"] = json!(notification.is_read_by(&auth.uid));

    Ok(Json(ApiResponse::ok(
        "Notification retrieved successfully",
        data,
    )))
}

/// Mark one notification as read for the caller.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked as read", body = ApiResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut notification = state
        .db
        .get_notification(collections::NOTIFICATIONS, &notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if !notification.is_read_by(&auth.uid) {
        notification.read_by.push(auth.uid.clone());
        notification.read_at = Some(now_rfc3339());
        state
            .db
            .update_notification(collections::NOTIFICATIONS, &notification)
            .await?;
    }

    Ok(Json(ApiResponse::ok_empty("Notification marked as read")))
}

/// Mark every unread notification as read for the caller.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses((status = 200, description = "All marked as read", body = ApiResponse)),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let notifications = state.db.notifications_for_user(&auth.uid).await?;

    let mut marked = 0usize;
    for mut notification in notifications {
        if notification.is_read_by(&auth.uid) {
            continue;
        }
        notification.read_by.push(auth.uid.clone());
        notification.read_at = Some(now_rfc3339());
        state
            .db
            .update_notification(collections::NOTIFICATIONS, &notification)
            .await?;
        marked += 1;
    }

    Ok(Json(ApiResponse::ok_empty(format!(
        "Marked {} notifications as read",
        marked
    ))))
}

/// Delete a notification. Only recipients of a targeted notification may
/// delete it; broadcasts cannot be deleted by users.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted", body = ApiResponse),
        (status = 403, description = "Not a recipient"),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let notification = state
        .db
        .get_notification(collections::NOTIFICATIONS, &notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if !notification.target_users.iter().any(|u| u == &auth.uid) {
        return Err(AppError::Forbidden(
            "Not authorized to delete this notification".to_string(),
        ));
    }

    state
        .db
        .delete_notification(collections::NOTIFICATIONS, &notification_id)
        .await?;

    Ok(Json(ApiResponse::ok_empty(
        "Notification deleted successfully",
    )))
}
