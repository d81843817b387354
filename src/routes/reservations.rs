// SPDX-License-Identifier: MIT

//! Reservation lifecycle: request, approve/decline, cancel, pickup.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{ApiResponse, Chat, Item, ItemSnapshot, Reservation, TrackingStatus};
use crate::services::{notify, tracking};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/reservations", post(create_reservation))
        .route(
            "/api/v1/reservations/{reservation_id}",
            get(get_reservation).delete(cancel_reservation),
        )
        .route(
            "/api/v1/reservations/{reservation_id}/status",
            put(update_reservation_status),
        )
        .route("/api/v1/items/{item_id}/reserve", post(reserve_item))
        .route("/api/v1/items/{item_id}/pickup", post(mark_picked_up))
        .route("/api/v1/user/reservations", get(my_reservations))
        .route("/api/v1/user/pickups", get(my_pickups))
        .route("/api/v1/donor/reservations", get(donor_reservations))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReservationRequest {
    #[validate(length(min = 1))]
    pub item_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub requested_quantity: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveForm {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReservationStatusForm {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PickupForm {
    #[serde(rename = "reservationId")]
    pub reservation_id: String,
}

/// Guard shared by both reservation entry points: the item must be available
/// and the requester must not be the donor.
async fn load_reservable_item(
    state: &AppState,
    item_id: &str,
    requester_uid: &str,
) -> Result<Item> {
    let item = state
        .db
        .get_item(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if item.status != "available" {
        return Err(AppError::BadRequest(
            "Item is not available for reservation".to_string(),
        ));
    }
    if item.donor_id == requester_uid {
        return Err(AppError::BadRequest(
            "Cannot reserve your own item".to_string(),
        ));
    }
    Ok(item)
}

async fn store_reservation(
    state: &AppState,
    auth_uid: &str,
    item: &Item,
    message: Option<String>,
    requested_quantity: i64,
    with_snapshot: bool,
) -> Result<Reservation> {
    let requester = state.db.get_user(auth_uid).await?;
    let requester_name = requester
        .as_ref()
        .map(|u| u.full_name.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let now = now_rfc3339();
    let mut reservation = Reservation {
        id: String::new(),
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        user_id: auth_uid.to_string(),
        user_name: requester_name,
        donor_id: item.donor_id.clone(),
        message,
        requested_quantity,
        status: "pending".to_string(),
        location: Some(item.location.clone()),
        created_at: now.clone(),
        updated_at: now,
        tracking_id: None,
        cancelled_at: None,
        picked_up_at: None,
        completed_at: None,
        item: with_snapshot.then(|| ItemSnapshot {
            name: item.name.clone(),
            category: item.category.clone(),
            images: item.images.clone(),
            pickup_times: item.pickup_times.clone(),
        }),
    };
    state.db.create_reservation(&mut reservation).await?;

    notify::create_notification(
        &state.db,
        "New Reservation Request",
        &format!("Someone wants to reserve your item '{}'", item.name),
        "reservation_request",
        vec![item.donor_id.clone()],
        false,
    )
    .await;

    Ok(reservation)
}

/// Create a reservation for an item, with an item snapshot embedded.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation created", body = ApiResponse),
        (status = 400, description = "Item unavailable or own item"),
        (status = 404, description = "Item not found")
    ),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ReservationRequest>,
) -> Result<Json<ApiResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let item = load_reservable_item(&state, &payload.item_id, &auth.uid).await?;
    let reservation = store_reservation(
        &state,
        &auth.uid,
        &item,
        payload.message.clone(),
        payload.requested_quantity.unwrap_or(1),
        true,
    )
    .await?;

    // Notify both parties by email, best effort
    if let Some(donor) = state.db.get_user(&item.donor_id).await? {
        if let Err(e) = state
            .email
            .send_reservation_request(
                &donor.email,
                &donor.full_name,
                &reservation.user_name,
                &item,
                payload.message.as_deref(),
            )
            .await
        {
            tracing::warn!(reservation_id = %reservation.id, "Failed to email donor: {}", e);
        }
    }
    if let Some(requester) = state.db.get_user(&auth.uid).await? {
        if let Err(e) = state
            .email
            .send_reservation_confirmation(
                &requester.email,
                &requester.full_name,
                &item.donor_name,
                &item,
            )
            .await
        {
            tracing::warn!(reservation_id = %reservation.id, "Failed to email requester: {}", e);
        }
    }

    Ok(Json(ApiResponse::ok(
        "Reservation created successfully",
        serde_json::to_value(&reservation)?,
    )))
}

/// Form-based reservation endpoint kept for older mobile clients.
#[utoipa::path(
    post,
    path = "/api/v1/items/{item_id}/reserve",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item reserved", body = ApiResponse),
        (status = 400, description = "Item unavailable or own item"),
        (status = 404, description = "Item not found")
    ),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn reserve_item(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
    Form(form): Form<ReserveForm>,
) -> Result<Json<ApiResponse>> {
    let item = load_reservable_item(&state, &item_id, &auth.uid).await?;
    let reservation = store_reservation(
        &state,
        &auth.uid,
        &item,
        form.message,
        form.quantity.unwrap_or(1),
        false,
    )
    .await?;

    Ok(Json(ApiResponse::ok(
        "Item reserved successfully",
        serde_json::to_value(&reservation)?,
    )))
}

/// Fetch one reservation with its item joined in. Participants only.
#[utoipa::path(
    get,
    path = "/api/v1/reservations/{reservation_id}",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation detail", body = ApiResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Reservation not found")
    ),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(reservation_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let reservation = state
        .db
        .get_reservation(&reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

    if reservation.user_id != auth.uid && reservation.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Not authorized to view this reservation".to_string(),
        ));
    }

    let mut data = serde_json::to_value(&reservation)?;
    if let Some(item) = state.db.get_item(&reservation.item_id).await? {
        data["item"] = serde_json::to_value(&item)?;
    }

    Ok(Json(ApiResponse::ok(
        "Reservation retrieved successfully",
        data,
    )))
}

/// Cancel a reservation. Requester only.
#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{reservation_id}",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Reservation not found")
    ),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(reservation_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let mut reservation = state
        .db
        .get_reservation(&reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

    if reservation.user_id != auth.uid {
        return Err(AppError::Forbidden(
            "Not authorized to cancel this reservation".to_string(),
        ));
    }

    reservation.status = "cancelled".to_string();
    reservation.cancelled_at = Some(now_rfc3339());
    reservation.updated_at = now_rfc3339();
    state.db.update_reservation(&reservation).await?;

    Ok(Json(ApiResponse::ok_empty(
        "Reservation cancelled successfully",
    )))
}

/// Decline every other pending reservation for an item after one is approved.
async fn reject_other_requests(
    state: &AppState,
    item: &Item,
    approved_reservation_id: &str,
) -> Result<()> {
    let pending = state.db.get_pending_reservations_for_item(&item.id).await?;
    let mut rejected = 0usize;

    for mut other in pending {
        if other.id == approved_reservation_id {
            continue;
        }
        other.status = "declined".to_string();
        other.updated_at = now_rfc3339();
        state.db.update_reservation(&other).await?;
        rejected += 1;

        notify::create_notification(
            &state.db,
            "Request Not Selected",
            &format!(
                "Your request for '{}' was not selected. The donor chose another requester. \
                 Keep looking - there are many other great items available!",
                item.name
            ),
            "reservation_declined",
            vec![other.user_id.clone()],
            false,
        )
        .await;
    }

    tracing::info!(item_id = %item.id, rejected, "Rejected other pending requests");
    Ok(())
}

/// Approve or decline a reservation. Donor only.
///
/// Approval creates a tracking record, adjusts the item (bulk quantity or
/// reserved status), declines competing requests and opens a chat room
/// between donor and requester if one does not exist yet.
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{reservation_id}/status",
    params(("reservation_id" = String, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse),
        (status = 403, description = "Not the donor"),
        (status = 404, description = "Reservation or item not found")
    ),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn update_reservation_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(reservation_id): Path<String>,
    Form(form): Form<ReservationStatusForm>,
) -> Result<Json<ApiResponse>> {
    let mut reservation = state
        .db
        .get_reservation(&reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

    let mut item = state
        .db
        .get_item(&reservation.item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if item.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Only the donor can update reservation status".to_string(),
        ));
    }

    reservation.status = form.status.clone();
    reservation.updated_at = now_rfc3339();
    state.db.update_reservation(&reservation).await?;

    let mut tracking_id = None;

    match form.status.as_str() {
        "approved" => {
            let code = tracking::create_tracking_record(
                &state.db,
                &reservation.id,
                &reservation.item_id,
                &item.donor_id,
                &reservation.user_id,
            )
            .await?;
            reservation.tracking_id = Some(code.clone());
            state.db.update_reservation(&reservation).await?;

            if item.is_bulk_item && item.quantity > 1 {
                let remaining = item.quantity - reservation.requested_quantity;
                if remaining <= 0 {
                    item.status = "donated".to_string();
                    item.quantity = 0;
                    item.updated_at = now_rfc3339();
                    state.db.update_item(&item).await?;
                    reject_other_requests(&state, &item, &reservation.id).await?;
                } else {
                    item.quantity = remaining;
                    item.updated_at = now_rfc3339();
                    state.db.update_item(&item).await?;
                }
            } else {
                item.status = "reserved".to_string();
                item.updated_at = now_rfc3339();
                state.db.update_item(&item).await?;
                reject_other_requests(&state, &item, &reservation.id).await?;
            }

            // One chat room per (item, requester, donor) triple
            let existing = state
                .db
                .find_chat(&reservation.item_id, &reservation.user_id, &item.donor_id)
                .await?;
            if existing.is_none() {
                let now = now_rfc3339();
                let mut chat = Chat {
                    id: String::new(),
                    reservation_id: reservation.id.clone(),
                    item_id: reservation.item_id.clone(),
                    donor_id: item.donor_id.clone(),
                    requester_id: reservation.user_id.clone(),
                    created_at: now.clone(),
                    last_message_at: now,
                    last_message: None,
                    is_active: true,
                };
                state.db.create_chat(&mut chat).await?;
            }

            notify::create_notification(
                &state.db,
                "Request Approved! 🎉",
                &format!(
                    "Great news! Your request for '{}' has been approved. Tracking ID: {}. \
                     You can now track your item and chat with the donor.",
                    item.name, code
                ),
                "reservation_approved",
                vec![reservation.user_id.clone()],
                false,
            )
            .await;

            if let Some(requester) = state.db.get_user(&reservation.user_id).await? {
                if let Err(e) = state
                    .email
                    .send_tracking(&requester.email, &requester.full_name, &item, &code)
                    .await
                {
                    tracing::warn!(tracking_id = %code, "Failed to send tracking email: {}", e);
                }
            }

            tracking_id = Some(code);
        }
        "declined" => {
            notify::create_notification(
                &state.db,
                "Request Declined",
                &format!(
                    "Unfortunately, your request for '{}' was declined. \
                     Don't worry, there are many other items available!",
                    item.name
                ),
                "reservation_declined",
                vec![reservation.user_id.clone()],
                false,
            )
            .await;
        }
        _ => {}
    }

    Ok(Json(ApiResponse::ok(
        format!("Reservation {} successfully", form.status),
        json!({ "tracking_id": tracking_id }),
    )))
}

/// Mark a reserved item as picked up. Requester only.
#[utoipa::path(
    post,
    path = "/api/v1/items/{item_id}/pickup",
    params(("item_id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item picked up", body = ApiResponse),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Reservation not found")
    ),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn mark_picked_up(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<String>,
    Form(form): Form<PickupForm>,
) -> Result<Json<ApiResponse>> {
    let mut reservation = state
        .db
        .get_reservation(&form.reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

    if reservation.user_id != auth.uid {
        return Err(AppError::Forbidden(
            "Not authorized to mark this item as picked up".to_string(),
        ));
    }

    let now = now_rfc3339();
    reservation.status = "picked_up".to_string();
    reservation.picked_up_at = Some(now.clone());
    reservation.updated_at = now.clone();
    state.db.update_reservation(&reservation).await?;

    if let Some(mut item) = state.db.get_item(&item_id).await? {
        item.status = "donated".to_string();
        item.updated_at = now;
        state.db.update_item(&item).await?;
    }

    if let Some(record) = state
        .db
        .find_tracking_for_reservation(&form.reservation_id)
        .await?
    {
        tracking::update_tracking_status(
            &state.db,
            &record.tracking_id,
            TrackingStatus::PickedUp,
            Some("Item successfully picked up by requester"),
            Some(&auth.uid),
        )
        .await?;
    }

    Ok(Json(ApiResponse::ok_empty(
        "Item marked as picked up successfully",
    )))
}

/// The caller's reservation requests, with items joined, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/user/reservations",
    responses((status = 200, description = "User reservations", body = ApiResponse)),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn my_reservations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut reservations = state.db.get_reservations_for_user(&auth.uid).await?;
    reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut joined = Vec::with_capacity(reservations.len());
    for reservation in &reservations {
        let mut entry = serde_json::to_value(reservation)?;
        if let Some(item) = state.db.get_item(&reservation.item_id).await? {
            entry["item"] = serde_json::to_value(&item)?;
        }
        joined.push(entry);
    }

    Ok(Json(ApiResponse::ok(
        "Reservations retrieved successfully",
        json!({ "reservations": joined, "total": joined.len() }),
    )))
}

/// The caller's completed pickups, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/user/pickups",
    responses((status = 200, description = "Completed pickups", body = ApiResponse)),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn my_pickups(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut pickups: Vec<Reservation> = state
        .db
        .get_reservations_for_user(&auth.uid)
        .await?
        .into_iter()
        .filter(|r| r.status == "picked_up")
        .collect();
    pickups.sort_by(|a, b| {
        let a_key = a.picked_up_at.as_deref().unwrap_or(&a.created_at);
        let b_key = b.picked_up_at.as_deref().unwrap_or(&b.created_at);
        b_key.cmp(a_key)
    });

    let mut joined = Vec::with_capacity(pickups.len());
    for reservation in &pickups {
        let mut entry = serde_json::to_value(reservation)?;
        if let Some(item) = state.db.get_item(&reservation.item_id).await? {
            entry["item"] = serde_json::to_value(&item)?;
        }
        joined.push(entry);
    }

    Ok(Json(ApiResponse::ok(
        "Pickups retrieved successfully",
        json!({ "pickups": joined, "total": joined.len() }),
    )))
}

/// Incoming requests for the caller's items, with item and a trimmed
/// requester profile joined in.
#[utoipa::path(
    get,
    path = "/api/v1/donor/reservations",
    responses((status = 200, description = "Incoming reservations", body = ApiResponse)),
    tag = "reservations",
    security(("bearer_auth" = []))
)]
pub async fn donor_reservations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut reservations = state.db.get_reservations_for_donor(&auth.uid).await?;
    reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut joined = Vec::with_capacity(reservations.len());
    for reservation in &reservations {
        let mut entry = serde_json::to_value(reservation)?;
        if let Some(item) = state.db.get_item(&reservation.item_id).await? {
            entry["item"] = serde_json::to_value(&item)?;
        }
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
        "Reservations retrieved successfully",
        json!({ "reservations": joined, "total": joined.len() }),
    )))
}
