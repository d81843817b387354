// SPDX-License-Identifier: MIT

//! Donation item routes: listing, search, CRUD, likes, favorites, reports.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    paginate, ApiResponse, DonorInfo, Favorite, Item, Like, Location, Report,
};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/items", get(list_items).post(create_item))
        .route("/api/v1/items/search", get(search_items))
        .route("/api/v1/items/category/{category}", get(items_by_category))
        .route(
            "/api/v1/items/{item_id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/v1/items/{item_id}/images", post(add_item_images))
        .route(
            "/api/v1/items/{item_id}/like",
            post(like_item).delete(unlike_item),
        )
        .route(
            "/api/v1/items/{item_id}/favorite",
            post(favorite_item).delete(unfavorite_item),
        )
        .route("/api/v1/items/{item_id}/report", post(report_item))
        .route("/api/v1/items/{item_id}/requests", get(item_requests))
        .route("/api/v1/user/donations", get(my_donations))
        .route("/api/v1/user/favorites", get(my_favorites))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListItemsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "sortBy")]
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default)
    #[serde(default, rename = "sortOrder")]
    pub sort_order: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[serde(default)]
    pub food_type: Option<String>,
    #[serde(default)]
    pub is_bulk_item: bool,
    #[serde(default)]
    pub quantity: Option<i64>,
    pub location: Location,
    pub pickup_times: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub is_for_sale: bool,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub food_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub pickup_times: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportItemRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

fn sort_items(items: &mut [Item], sort_by: Option<&str>, sort_order: Option<&str>) {
    let ascending = sort_order == Some("asc");
    items.sort_by(|a, b| {
        let ord = match sort_by {
            Some("name") => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Some("expiry_date") => a.expiry_date.cmp(&b.expiry_date),
            _ => a.created_at.cmp(&b.created_at),
        };
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

fn matches_search(item: &Item, needle: &str) -> bool {
    item.name.to_lowercase().contains(needle) || item.description.to_lowercase().contains(needle)
}

/// Browse items with filtering, search, sorting and pagination.
///
/// The response also carries the caller's unread message count, unread
/// notification count and pending donor request count so the mobile client
/// can refresh its badges in one round trip.
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ListItemsQuery),
    responses((status = 200, description = "Paginated item list", body = ApiResponse)),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ApiResponse>> {
    let mut items = state.db.list_items().await?;

    if let Some(category) = &query.category {
        items.retain(|i| i.category.eq_ignore_ascii_case(category));
    }
    if let Some(status) = &query.status {
        items.retain(|i| i.status == *status);
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        items.retain(|i| matches_search(i, &needle));
    }

    sort_items(&mut items, query.sort_by.as_deref(), query.sort_order.as_deref());

    let (page_items, total, total_pages) = paginate(&items, query.page, query.limit);

    let all_unread_messages_count = state.db.unread_messages_count(&auth.uid).await?;
    let un_read_notifications_count = state
        .db
        .notifications_for_user(&auth.uid)
        .await?
        .iter()
        .filter(|n| !n.is_read_by(&auth.uid))
        .count();
    let donor_requests_count = state
        .db
        .get_reservations_for_donor(&auth.uid)
        .await?
        .iter()
        .filter(|r| r.status == "pending")
        .count();

    Ok(Json(ApiResponse::ok(
        "Items retrieved successfully",
        json!({
            "all_unread_messages_count": all_unread_messages_count,
            "un_read_notifications_count": un_read_notifications_count,
            "donor_requests_count": donor_requests_count,
            "items": serde_json::to_value(&page_items)?,
            "total": total,
            "page": query.page,
            "limit": query.limit,
            "total_pages": total_pages,
        }),
    )))
}

/// Create a donation item with a denormalized donor snapshot.
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Item created", body = ApiResponse),
        (status = 404, description = "Donor profile not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let donor = state
        .db
        .get_user(&auth.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let now = now_rfc3339();
    let mut item = Item {
        id: String::new(),
        name: payload.name,
        description: payload.description,
        category: payload.category,
        food_type: payload.food_type,
        is_bulk_item: payload.is_bulk_item,
        quantity: payload.quantity.unwrap_or(1),
        donor: DonorInfo {
            id: donor.uid.clone(),
            name: donor.full_name.clone(),
            account_type: donor.account_type.clone(),
            rating: donor.rating,
            photo_url: donor.photo_url.clone(),
            phone: donor.phone_number.clone(),
            email: donor.email.clone(),
        },
        donor_id: donor.uid.clone(),
        donor_name: donor.full_name.clone(),
        location: payload.location,
        pickup_times: payload.pickup_times,
        expiry_date: payload.expiry_date,
        is_for_sale: payload.is_for_sale,
        price: payload.price.unwrap_or(0.0),
        images: payload.images,
        status: "available".to_string(),
        is_verified: false,
        likes: 0,
        views: 0,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.create_item(&mut item).await?;

    if let Err(e) = state
        .email
        .send_donation_confirmation(&donor.email, &donor.full_name, &item)
        .await
    {
        tracing::warn!(item_id = %item.id, "Failed to send donation confirmation: {}", e);
    }

    Ok(Json(ApiResponse::ok(
        "Item created successfully",
        serde_json::to_value(&item)?,
    )))
}

/// Full-text search over available items.
#[utoipa::path(
    get,
    path = "/api/v1/items/search",
    params(SearchQuery),
    responses((status = 200, description = "Matching items", body = ApiResponse)),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn search_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse>> {
    let needle = query.q.trim().to_lowercase();
    if needle.is_empty() {
        return Err(AppError::BadRequest(
            "Search query cannot be empty".to_string(),
        ));
    }

    let mut items = state.db.list_items().await?;
    items.retain(|i| i.status == "available" && matches_search(i, &needle));
    if let Some(category) = &query.category {
        items.retain(|i| i.category.eq_ignore_ascii_case(category));
    }
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ApiResponse::ok(
        "Search completed successfully",
        json!({ "items": serde_json::to_value(&items)?, "total": items.len() }),
    )))
}

/// Available items in one category, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/items/category/{category}",
    params(("category" = String, Path, description = "Item category")),
    responses((status = 200, description = "Items in category", body = ApiResponse)),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn items_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut items = state.db.list_items().await?;
    items.retain(|i| i.status == "available" && i.category.eq_ignore_ascii_case(&category));
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ApiResponse::ok(
        "Items retrieved successfully",
        json!({ "items": serde_json::to_value(&items)?, "total": items.len() }),
    )))
}

/// Fetch a single item. Each fetch counts as a view.
#[utoipa::path(
    get,
    path = "/api/v1/items/{item_id}",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item detail", body = ApiResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    item.views += 1;
    state.db.update_item(&item).await?;

    Ok(Json(ApiResponse::ok(
        "Item retrieved successfully",
        serde_json::to_value(&item)?,
    )))
}

/// Update an item. Only the donor may edit it.
#[utoipa::path(
    put,
    path = "/api/v1/items/{item_id}",
    params(("item_id" = String, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse),
        (status = 403, description = "Not the donor"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if item.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Only the donor can update this item".to_string(),
        ));
    }

    if let Some(name) = payload.name {
        item.name = name;
    }
    if let Some(description) = payload.description {
        item.description = description;
    }
    if let Some(category) = payload.category {
        item.category = category;
    }
    if let Some(food_type) = payload.food_type {
        item.food_type = Some(food_type);
    }
    if let Some(quantity) = payload.quantity {
        item.quantity = quantity;
    }
    if let Some(location) = payload.location {
        item.location = location;
    }
    if let Some(pickup_times) = payload.pickup_times {
        item.pickup_times = pickup_times;
    }
    if let Some(expiry_date) = payload.expiry_date {
        item.expiry_date = Some(expiry_date);
    }
    if let Some(price) = payload.price {
        item.price = price;
    }
    if let Some(images) = payload.images {
        item.images = images;
    }
    if let Some(status) = payload.status {
        item.status = status;
    }
    item.updated_at = now_rfc3339();

    state.db.update_item(&item).await?;

    Ok(Json(ApiResponse::ok(
        "Item updated successfully",
        serde_json::to_value(&item)?,
    )))
}

/// Delete an item and everything referencing it.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{item_id}",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = ApiResponse),
        (status = 403, description = "Not the donor"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if item.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Only the donor can delete this item".to_string(),
        ));
    }

    state.db.delete_item(&item_id).await?;

    Ok(Json(ApiResponse::ok_empty("Item deleted successfully")))
}

/// Upload additional images for an item.
#[utoipa::path(
    post,
    path = "/api/v1/items/{item_id}/images",
    params(("item_id" = String, Path, description = "Item ID")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Images uploaded", body = ApiResponse),
        (status = 403, description = "Not the donor"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn add_item_images(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if item.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Only the donor can add images to this item".to_string(),
        ));
    }

    let mut uploaded = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let filename = field.file_name().unwrap_or("upload.jpg").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;

        match state
            .storage
            .upload_image(&filename, &content_type, &data)
            .await
        {
            Ok(url) => uploaded.push(url),
            // Skip fields that are not images, upload the rest
            Err(AppError::BadRequest(reason)) => {
                tracing::debug!(filename = %filename, "Skipping upload: {}", reason);
            }
            Err(e) => return Err(e),
        }
    }

    if uploaded.is_empty() {
        return Err(AppError::BadRequest("No valid images provided".to_string()));
    }

    item.images.extend(uploaded.iter().cloned());
    item.updated_at = now_rfc3339();
    state.db.update_item(&item).await?;

    Ok(Json(ApiResponse::ok(
        "Images uploaded successfully",
        json!({ "images": item.images, "uploaded": uploaded }),
    )))
}

/// Like an item.
#[utoipa::path(
    post,
    path = "/api/v1/items/{item_id}/like",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item liked", body = ApiResponse),
        (status = 400, description = "Already liked"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn like_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if state.db.get_like(&item_id, &auth.uid).await?.is_some() {
        return Err(AppError::BadRequest("Item already liked".to_string()));
    }

    state
        .db
        .put_like(&Like {
            item_id: item_id.clone(),
            user_id: auth.uid.clone(),
            created_at: now_rfc3339(),
        })
        .await?;

    item.likes += 1;
    state.db.update_item(&item).await?;

    Ok(Json(ApiResponse::ok(
        "Item liked successfully",
        json!({ "likes": item.likes }),
    )))
}

/// Remove a like.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{item_id}/like",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Like removed", body = ApiResponse),
        (status = 400, description = "Not liked"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn unlike_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if state.db.get_like(&item_id, &auth.uid).await?.is_none() {
        return Err(AppError::BadRequest("Item not liked".to_string()));
    }

    state.db.delete_like(&item_id, &auth.uid).await?;

    item.likes = (item.likes - 1).max(0);
    state.db.update_item(&item).await?;

    Ok(Json(ApiResponse::ok(
        "Like removed successfully",
        json!({ "likes": item.likes }),
    )))
}

/// Add an item to the caller's favorites.
#[utoipa::path(
    post,
    path = "/api/v1/items/{item_id}/favorite",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Added to favorites", body = ApiResponse),
        (status = 400, description = "Already in favorites"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn favorite_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if state.db.get_favorite(&item_id, &auth.uid).await?.is_some() {
        return Err(AppError::BadRequest(
            "Item already in favorites".to_string(),
        ));
    }

    state
        .db
        .put_favorite(&Favorite {
            item_id,
            user_id: auth.uid.clone(),
            created_at: now_rfc3339(),
        })
        .await?;

    Ok(Json(ApiResponse::ok_empty("Added to favorites")))
}

/// Remove an item from the caller's favorites.
#[utoipa::path(
    delete,
    path = "/api/v1/items/{item_id}/favorite",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Removed from favorites", body = ApiResponse),
        (status = 400, description = "Not in favorites")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn unfavorite_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    if state.db.get_favorite(&item_id, &auth.uid).await?.is_none() {
        return Err(AppError::BadRequest("Item not in favorites".to_string()));
    }

    state.db.delete_favorite(&item_id, &auth.uid).await?;

    Ok(Json(ApiResponse::ok_empty("Removed from favorites")))
}

/// File a report against an item.
#[utoipa::path(
    post,
    path = "/api/v1/items/{item_id}/report",
    params(("item_id" = String, Path, description = "Item ID")),
    request_body = ReportItemRequest,
    responses(
        (status = 200, description = "Report filed", body = ApiResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn report_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
    Json(payload): Json<ReportItemRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    let mut report = Report {
        id: String::new(),
        item_id,
        reporter_id: auth.uid.clone(),
        reason: payload.reason,
        description: payload.description,
        status: "pending".to_string(),
        created_at: now_rfc3339(),
        resolved_at: None,
        resolved_by: None,
    };
    state.db.create_report(&mut report).await?;

    Ok(Json(ApiResponse::ok(
        "Report submitted successfully",
        serde_json::to_value(&report)?,
    )))
}

/// Reservation requests for one of the caller's items, with requester
/// profiles joined in.
#[utoipa::path(
    get,
    path = "/api/v1/items/{item_id}/requests",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Reservation requests", body = ApiResponse),
        (status = 403, description = "Not the donor"),
        (status = 404, description = "Item not found")
    ),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn item_requests(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let item = state
        .db
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if item.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Only the donor can view requests for this item".to_string(),
        ));
    }

    let reservations = state.db.get_reservations_for_item(&item_id).await?;
    let mut joined = Vec::with_capacity(reservations.len());
    for reservation in &reservations {
        let mut entry = serde_json::to_value(reservation)?;
        if let Some(requester) = state.db.get_user(&reservation.user_id).await? {
            entry["requester"] = json!({
                "full_name": requester.full_name,
                "photo_url": requester.photo_url,
                "rating": requester.rating,
            });
        }
        joined.push(entry);
    }

    Ok(Json(ApiResponse::ok(
        "Requests retrieved successfully",
        json!({ "reservations": joined }),
    )))
}

/// The caller's donated items, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/user/donations",
    responses((status = 200, description = "Donated items", body = ApiResponse)),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn my_donations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut items = state.db.get_items_by_donor(&auth.uid).await?;
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ApiResponse::ok(
        "Donations retrieved successfully",
        json!({ "items": serde_json::to_value(&items)?, "total": items.len() }),
    )))
}

/// The caller's favorited items, most recently favorited first.
#[utoipa::path(
    get,
    path = "/api/v1/user/favorites",
    responses((status = 200, description = "Favorited items", body = ApiResponse)),
    tag = "items",
    security(("bearer_auth" = []))
)]
pub async fn my_favorites(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut favorites = state.db.get_favorites_for_user(&auth.uid).await?;
    favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut items = Vec::with_capacity(favorites.len());
    for favorite in &favorites {
        // Favorites of deleted items are silently dropped
        if let Some(item) = state.db.get_item(&favorite.item_id).await? {
            let mut entry = serde_json::to_value(&item)?;
            entry["favorited_at"] = json!(favorite.created_at);
            items.push(entry);
        }
    }

    Ok(Json(ApiResponse::ok(
        "Favorites retrieved successfully",
        json!({ "items": items, "total": items.len() }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListItemsQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert!(query.category.is_none());
    }
}
