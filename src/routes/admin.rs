// SPDX-License-Identifier: MIT

//! Admin dashboard routes, nested under `/api/v1/admin`.

use crate::db::collections;
use crate::error::{AppError, Result};
use crate::middleware::AdminUser;
use crate::models::{paginate, ApiResponse, Item, User};
use crate::services::notify;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/logout", post(logout))
        .route("/users", get(list_users))
        .route("/users/{user_id}", axum::routing::delete(delete_user))
        .route("/users/{user_id}/status", put(update_user_status))
        .route("/users/{user_id}/items", get(user_items))
        .route("/statistics", get(statistics))
        .route("/items", get(list_items))
        .route("/items/bulk-delete", post(bulk_delete_items))
        .route(
            "/items/{item_id}",
            get(item_details).put(update_item).delete(delete_item),
        )
        .route("/items/{item_id}/verify", put(verify_item))
        .route(
            "/notifications",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/notifications/{notification_id}",
            get(notification_details).delete(delete_notification),
        )
        .route(
            "/notifications/{notification_id}/resend",
            post(resend_notification),
        )
        .route("/reports/{report_id}/resolve", put(resolve_report))
        .route("/demand-areas", get(demand_areas))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AdminUsersQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// "active" or "inactive"
    #[serde(default)]
    pub status_filter: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AdminItemsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
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

fn default_sort_by() -> String {
    "created_at".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAdminProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pickup_times: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyItemRequest {
    pub is_verified: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkDeleteItemsRequest {
    pub item_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NotificationRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub target_users: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResendNotificationRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Admin dashboard profile. Static apart from the configured email.
#[utoipa::path(
    get,
    path = "/api/v1/admin/profile",
    responses((status = 200, description = "Admin profile", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    Ok(Json(ApiResponse::ok(
        "Admin profile retrieved successfully",
        json!({
            "id": "admin_001",
            "email": state.config.admin_email,
            "full_name": "ShareCare Admin",
            "role": "super_admin",
            "permissions": [
                "manage_users",
                "manage_items",
                "view_analytics",
                "manage_notifications",
                "system_settings",
            ],
            "last_login": now_rfc3339(),
            "created_at": "2024-01-01T00:00:00.000Z",
            "avatar_url": null,
            "department": "System Administration",
        }),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/profile",
    request_body = UpdateAdminProfileRequest,
    responses((status = 200, description = "Profile updated", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateAdminProfileRequest>,
) -> Result<Json<ApiResponse>> {
    Ok(Json(ApiResponse::ok(
        "Admin profile updated successfully",
        json!({
            "id": "admin_001",
            "email": state.config.admin_email,
            "full_name": payload.full_name.unwrap_or_else(|| "ShareCare Admin".to_string()),
            "role": "super_admin",
            "phone": payload.phone,
            "department": payload
                .department
                .unwrap_or_else(|| "System Administration".to_string()),
            "updated_at": now_rfc3339(),
        }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses((status = 200, description = "Logged out", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn logout(Extension(admin): Extension<AdminUser>) -> Json<ApiResponse> {
    tracing::info!(email = %admin.email, "Admin logged out");
    Json(ApiResponse::ok_empty("Admin logged out successfully"))
}

fn sort_users(users: &mut [User], sort_by: &str, sort_order: &str) {
    let ascending = sort_order == "asc";
    users.sort_by(|a, b| {
        let ord = match sort_by {
            "name" => a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()),
            "email" => a.email.to_lowercase().cmp(&b.email.to_lowercase()),
            _ => a.created_at.cmp(&b.created_at),
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

/// All registered users with filtering, search, sorting and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(AdminUsersQuery),
    responses((status = 200, description = "Paginated user list", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminUsersQuery>,
) -> Result<Json<ApiResponse>> {
    let mut users = state.db.list_users().await?;

    match query.status_filter.as_deref() {
        Some("active") => users.retain(|u| u.is_active),
        Some("inactive") => users.retain(|u| !u.is_active),
        _ => {}
    }
    if let Some(account_type) = &query.account_type {
        users.retain(|u| u.account_type == *account_type);
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        users.retain(|u| {
            u.full_name.to_lowercase().contains(&needle)
                || u.email.to_lowercase().contains(&needle)
        });
    }

    sort_users(&mut users, &query.sort_by, &query.sort_order);

    let (page_users, total, total_pages) = paginate(&users, query.page, query.limit);

    Ok(Json(ApiResponse::ok(
        "Users retrieved successfully",
        json!({
            "users": serde_json::to_value(&page_users)?,
            "total": total,
            "page": query.page,
            "limit": query.limit,
            "total_pages": total_pages,
        }),
    )))
}

/// Activate or deactivate a user account.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{user_id}/status",
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_user_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> Result<Json<ApiResponse>> {
    let mut user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    user.is_active = payload.is_active;
    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    let action = if payload.is_active {
        "activated"
    } else {
        "deactivated"
    };
    tracing::info!(user_id = %user_id, "User {}", action);

    Ok(Json(ApiResponse::ok_empty(format!(
        "User {} successfully",
        action
    ))))
}

/// Delete a user account and everything referencing it.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Confirmation email goes out before the account disappears
    if let Err(e) = state
        .email
        .send_account_deletion(&user.email, &user.full_name)
        .await
    {
        tracing::warn!(user_id = %user_id, "Failed to send deletion confirmation: {}", e);
    }

    let deleted = state.db.delete_user_data(&user_id).await?;
    tracing::info!(user_id = %user_id, deleted, "User deleted");

    Ok(Json(ApiResponse::ok_empty("User deleted successfully")))
}

/// A user's profile together with their donated items and reservations.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{user_id}/items",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User items", body = ApiResponse),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn user_items(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let items = state.db.get_items_by_donor(&user_id).await?;
    let reservations = state.db.get_reservations_for_user(&user_id).await?;

    Ok(Json(ApiResponse::ok(
        "User items retrieved successfully",
        json!({
            "user": serde_json::to_value(&user)?,
            "donated_items": serde_json::to_value(&items)?,
            "reserved_items": serde_json::to_value(&reservations)?,
            "total_donated": items.len(),
            "total_reserved": reservations.len(),
        }),
    )))
}

/// First day of the month `offset` months before the given date.
fn month_start(now: chrono::DateTime<Utc>, offset: u32) -> (i32, u32) {
    let months = now.year() * 12 + now.month0() as i32 - offset as i32;
    (months.div_euclid(12), months.rem_euclid(12) as u32 + 1)
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn items_in_month(items: &[Item], year: i32, month: u32) -> usize {
    items
        .iter()
        .filter(|i| {
            chrono::DateTime::parse_from_rfc3339(&i.created_at)
                .map(|d| d.year() == year && d.month() == month)
                .unwrap_or(false)
        })
        .count()
}

/// Dashboard statistics: user and item totals, category breakdown, a six
/// month item trend and the ten most active donors.
#[utoipa::path(
    get,
    path = "/api/v1/admin/statistics",
    responses((status = 200, description = "Dashboard statistics", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn statistics(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    let users = state.db.list_users().await?;
    let items = state.db.list_items().await?;

    let active_users = users.iter().filter(|u| u.is_active).count();
    let individual_accounts = users
        .iter()
        .filter(|u| u.account_type == "individual")
        .count();
    let business_accounts = users
        .iter()
        .filter(|u| u.account_type == "business")
        .count();

    let available_items = items.iter().filter(|i| i.status == "available").count();
    let reserved_items = items.iter().filter(|i| i.status == "reserved").count();
    let donated_items = items.iter().filter(|i| i.status == "donated").count();

    let mut by_category: HashMap<String, usize> = HashMap::new();
    for item in &items {
        *by_category.entry(item.category.clone()).or_default() += 1;
    }

    // Six months of item counts, oldest first
    let now = Utc::now();
    let mut monthly_items = Vec::with_capacity(6);
    for offset in (0..6).rev() {
        let (year, month) = month_start(now, offset);
        monthly_items.push(json!({
            "month": format!("{} {}", MONTH_NAMES[(month - 1) as usize], year),
            "items": items_in_month(&items, year, month),
        }));
    }

    let mut donor_counts: HashMap<&str, (usize, &str)> = HashMap::new();
    for item in &items {
        let entry = donor_counts
            .entry(item.donor_id.as_str())
            .or_insert((0, item.donor_name.as_str()));
        entry.0 += 1;
    }
    let mut most_active: Vec<_> = donor_counts.into_iter().collect();
    most_active.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
    let most_active_donors: Vec<_> = most_active
        .into_iter()
        .take(10)
        .map(|(id, (count, name))| json!({ "id": id, "name": name, "items": count }))
        .collect();

    Ok(Json(ApiResponse::ok(
        "Statistics retrieved successfully",
        json!({
            "users": {
                "total": users.len(),
                "active": active_users,
                "inactive": users.len() - active_users,
                "individual": individual_accounts,
                "business": business_accounts,
            },
            "items": {
                "total": items.len(),
                "available": available_items,
                "reserved": reserved_items,
                "donated": donated_items,
                "by_category": by_category,
            },
            "monthly_items": monthly_items,
            "most_active_donors": most_active_donors,
        }),
    )))
}

fn sort_admin_items(items: &mut [Item], sort_by: &str, sort_order: &str) {
    let ascending = sort_order == "asc";
    items.sort_by(|a, b| {
        let ord = match sort_by {
            "name" => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            "expiry_date" => a.expiry_date.cmp(&b.expiry_date),
            _ => a.created_at.cmp(&b.created_at),
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

/// All items with filtering, search, sorting and pagination.
#[utoipa::path(
    get,
    path = "/api/v1/admin/items",
    params(AdminItemsQuery),
    responses((status = 200, description = "Paginated item list", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminItemsQuery>,
) -> Result<Json<ApiResponse>> {
    let mut items = state.db.list_items().await?;

    if let Some(category) = &query.category {
        items.retain(|i| i.category == *category);
    }
    if let Some(status) = &query.status {
        items.retain(|i| i.status == *status);
    }
    if let Some(verified) = query.verified {
        items.retain(|i| i.is_verified == verified);
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        items.retain(|i| {
            i.name.to_lowercase().contains(&needle)
                || i.description.to_lowercase().contains(&needle)
        });
    }

    sort_admin_items(&mut items, &query.sort_by, &query.sort_order);

    let (page_items, total, total_pages) = paginate(&items, query.page, query.limit);

    Ok(Json(ApiResponse::ok(
        "Items retrieved successfully",
        json!({
            "items": serde_json::to_value(&page_items)?,
            "total": total,
            "page": query.page,
            "limit": query.limit,
            "total_pages": total_pages,
        }),
    )))
}

/// One item with its reservations and reports joined in.
#[utoipa::path(
    get,
    path = "/api/v1/admin/items/{item_id}",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item detail", body = ApiResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn item_details(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let reservations = state.db.get_reservations_for_item(&item_id).await?;
    let reports: Vec<_> = state
        .db
        .list_reports()
        .await?
        .into_iter()
        .filter(|r| r.item_id == item_id)
        .collect();

    let mut data = serde_json::to_value(&item)?;
    data["reservations"] = serde_json::to_value(&reservations)?;
    data["reports"] = serde_json::to_value(&reports)?;

    Ok(Json(ApiResponse::ok(
        "Item details retrieved successfully",
        data,
    )))
}

/// Edit item fields from the dashboard.
#[utoipa::path(
    put,
    path = "/api/v1/admin/items/{item_id}",
    params(("item_id" = String, Path, description = "Item ID")),
    request_body = AdminUpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Json(payload): Json<AdminUpdateItemRequest>,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if let Some(name) = payload.name {
        item.name = name;
    }
    if let Some(description) = payload.description {
        item.description = description;
    }
    if let Some(category) = payload.category {
        item.category = category;
    }
    if let Some(pickup_times) = payload.pickup_times {
        item.pickup_times = pickup_times;
    }
    if let Some(expiry_date) = payload.expiry_date {
        item.expiry_date = Some(expiry_date);
    }
    item.updated_at = now_rfc3339();
    state.db.update_item(&item).await?;

    Ok(Json(ApiResponse::ok_empty("Item updated successfully")))
}

/// Set or clear an item's verified badge.
#[utoipa::path(
    put,
    path = "/api/v1/admin/items/{item_id}/verify",
    params(("item_id" = String, Path, description = "Item ID")),
    request_body = VerifyItemRequest,
    responses(
        (status = 200, description = "Verification updated", body = ApiResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn verify_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Json(payload): Json<VerifyItemRequest>,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    item.is_verified = payload.is_verified;
    item.updated_at = now_rfc3339();
    state.db.update_item(&item).await?;

    let action = if payload.is_verified {
        "verified"
    } else {
        "unverified"
    };
    tracing::info!(item_id = %item_id, "Item {}", action);

    Ok(Json(ApiResponse::ok_empty(format!(
        "Item {} successfully",
        action
    ))))
}

/// Delete an item and its related documents.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/items/{item_id}",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = ApiResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    state.db.delete_item(&item_id).await?;
    tracing::info!(item_id = %item_id, "Item deleted by admin");

    Ok(Json(ApiResponse::ok_empty("Item deleted successfully")))
}

/// Delete several items in one call. Items that fail to delete are skipped.
#[utoipa::path(
    post,
    path = "/api/v1/admin/items/bulk-delete",
    request_body = BulkDeleteItemsRequest,
    responses((status = 200, description = "Items deleted", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn bulk_delete_items(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkDeleteItemsRequest>,
) -> Result<Json<ApiResponse>> {
    let mut deleted_count = 0usize;
    for item_id in &payload.item_ids {
        match state.db.delete_item(item_id).await {
            Ok(()) => deleted_count += 1,
            Err(e) => {
                tracing::error!(item_id = %item_id, "Failed to delete item: {}", e);
            }
        }
    }
    tracing::info!(deleted_count, "Bulk deleted items");

    Ok(Json(ApiResponse::ok_empty(format!(
        "Successfully deleted {} items",
        deleted_count
    ))))
}

/// Paginated admin notification feed, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/notifications",
    params(PageQuery),
    responses((status = 200, description = "Notification list", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse>> {
    let mut notifications = state
        .db
        .list_notifications(collections::ADMIN_NOTIFICATIONS)
        .await?;
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (page_items, total, total_pages) = paginate(&notifications, query.page, query.limit);

    Ok(Json(ApiResponse::ok(
        "Notifications retrieved successfully",
        json!({
            "notifications": serde_json::to_value(&page_items)?,
            "total": total,
            "page": query.page,
            "limit": query.limit,
            "total_pages": total_pages,
        }),
    )))
}

/// One admin notification with its delivery statistics.
///
/// Broadcast sends have no per-user delivery data, so the stats fall back to
/// an estimated reach.
#[utoipa::path(
    get,
    path = "/api/v1/admin/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification detail", body = ApiResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn notification_details(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let notification = state
        .db
        .get_notification(collections::ADMIN_NOTIFICATIONS, &notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    let total_sent = if notification.target_users.is_empty() {
        1000
    } else {
        notification.target_users.len()
    };
    let delivered = total_sent * 95 / 100;

    let mut data = serde_json::to_value(&notification)?;
    data["delivery_stats"] = json!({
        "total_sent": total_sent,
        "delivered": delivered,
        "read": notification.read_by.len(),
        "failed": total_sent - delivered,
    });

    Ok(Json(ApiResponse::ok(
        "Notification details retrieved successfully",
        data,
    )))
}

/// Create a notification from the dashboard. An empty target list makes it a
/// broadcast.
#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications",
    request_body = NotificationRequest,
    responses((status = 200, description = "Notification created", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NotificationRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    notify::create_notification(
        &state.db,
        &payload.title,
        &payload.message,
        &payload.kind,
        payload.target_users,
        true,
    )
    .await;

    Ok(Json(ApiResponse::ok_empty(
        "Notification created successfully",
    )))
}

/// Resend a notification, optionally with a new message.
#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications/{notification_id}/resend",
    params(("notification_id" = String, Path, description = "Notification ID")),
    request_body = ResendNotificationRequest,
    responses(
        (status = 200, description = "Notification resent", body = ApiResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn resend_notification(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
    Json(payload): Json<ResendNotificationRequest>,
) -> Result<Json<ApiResponse>> {
    let original = state
        .db
        .get_notification(collections::ADMIN_NOTIFICATIONS, &notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    let message = payload.message.unwrap_or_else(|| original.message.clone());
    notify::create_notification(
        &state.db,
        &original.title,
        &message,
        &original.kind,
        original.target_users.clone(),
        true,
    )
    .await;

    Ok(Json(ApiResponse::ok_empty(
        "Notification resent successfully",
    )))
}

/// Delete an admin notification.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted", body = ApiResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    state
        .db
        .get_notification(collections::ADMIN_NOTIFICATIONS, &notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    state
        .db
        .delete_notification(collections::ADMIN_NOTIFICATIONS, &notification_id)
        .await?;

    Ok(Json(ApiResponse::ok_empty(
        "Notification deleted successfully",
    )))
}

/// Mark a report as resolved.
#[utoipa::path(
    put,
    path = "/api/v1/admin/reports/{report_id}/resolve",
    params(("report_id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report resolved", body = ApiResponse),
        (status = 404, description = "Report not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn resolve_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut report = state
        .db
        .get_report(&report_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    report.status = "resolved".to_string();
    report.resolved_at = Some(now_rfc3339());
    report.resolved_by = Some("admin".to_string());
    state.db.update_report(&report).await?;

    Ok(Json(ApiResponse::ok_empty("Report resolved successfully")))
}

/// Reservation hotspots for the map view. Coordinates are rounded to three
/// decimals (about 110 m) before grouping.
#[utoipa::path(
    get,
    path = "/api/v1/admin/demand-areas",
    responses((status = 200, description = "Demand areas", body = ApiResponse)),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn demand_areas(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>> {
    let mut demand: HashMap<String, (f64, f64, String, usize)> = HashMap::new();

    let reservations = state.db.list_reservations().await?;
    for reservation in &reservations {
        let Some(location) = &reservation.location else {
            continue;
        };
        let lat = (location.latitude * 1000.0).round() / 1000.0;
        let lng = (location.longitude * 1000.0).round() / 1000.0;
        let key = format!("{},{}", lat, lng);
        let entry = demand
            .entry(key)
            .or_insert((lat, lng, location.address.clone(), 0));
        entry.3 += 1;
    }

    let mut areas: Vec<_> = demand
        .into_values()
        .map(|(lat, lng, address, count)| {
            let (level, color) = if count >= 10 {
                ("high", "red")
            } else if count >= 5 {
                ("medium", "orange")
            } else {
                ("low", "yellow")
            };
            json!({
                "location": { "latitude": lat, "longitude": lng, "address": address },
                "demand_count": count,
                "demand_level": level,
                "color": color,
            })
        })
        .collect();
    areas.sort_by(|a, b| {
        let a_count = a["demand_count"].as_u64().unwrap_or(0);
        let b_count = b["demand_count"].as_u64().unwrap_or(0);
        b_count.cmp(&a_count)
    });

    Ok(Json(ApiResponse::ok(
        "Demand areas retrieved successfully",
        json!({ "demand_areas": areas, "total": areas.len() }),
    )))
}
