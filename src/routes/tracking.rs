// SPDX-License-Identifier: MIT

//! Donation tracking routes.

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{ApiResponse, TrackingStatus};
use crate::services::{notify, tracking};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/tracking/{tracking_id}", get(get_tracking_info))
        .route(
            "/api/v1/tracking/{tracking_id}/status",
            put(update_tracking_status),
        )
        .route("/api/v1/user/tracking", get(my_tracking))
        .route("/api/v1/donor/tracking", get(donor_tracking))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTrackingStatusRequest {
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Look up a tracking record by its code. Participants only.
///
/// Codes are case-insensitive; whatever the user typed is uppercased before
/// the lookup.
#[utoipa::path(
    get,
    path = "/api/v1/tracking/{tracking_id}",
    params(("tracking_id" = String, Path, description = "Tracking code, e.g. SC260829A1B2C3")),
    responses(
        (status = 200, description = "Tracking detail", body = ApiResponse),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Tracking ID not found")
    ),
    tag = "tracking",
    security(("bearer_auth" = []))
)]
pub async fn get_tracking_info(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(tracking_id): Path<String>,
) -> Result<Json<ApiResponse>> {
    let code = tracking_id.trim().to_uppercase();
    let record = state
        .db
        .find_tracking(&code)
        .await?
        .ok_or_else(|| AppError::NotFound("Tracking ID not found".to_string()))?;

    if record.requester_id != auth.uid && record.donor_id != auth.uid {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let mut data = serde_json::to_value(&record)?;
    if let Some(item) = state.db.get_item(&record.item_id).await? {
        data["item"] = serde_json::to_value(&item)?;
    }
    if let Some(reservation) = state.db.get_reservation(&record.reservation_id).await? {
        data["reservation"] = serde_json::to_value(&reservation)?;
    }
    data["status_definitions"] = TrackingStatus::catalogue();

    Ok(Json(ApiResponse::ok(
        "Tracking information retrieved successfully",
        data,
    )))
}

/// Advance a tracking record to a new status. Donor only.
///
/// Reaching "picked_up" or "completed" also completes the reservation,
/// marks non-bulk items as donated and notifies the requester.
#[utoipa::path(
    put,
    path = "/api/v1/tracking/{tracking_id}/status",
    params(("tracking_id" = String, Path, description = "Tracking code")),
    request_body = UpdateTrackingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse),
        (status = 400, description = "Invalid tracking status"),
        (status = 403, description = "Not the donor"),
        (status = 404, description = "Tracking ID not found")
    ),
    tag = "tracking",
    security(("bearer_auth" = []))
)]
pub async fn update_tracking_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(tracking_id): Path<String>,
    Json(payload): Json<UpdateTrackingStatusRequest>,
) -> Result<Json<ApiResponse>> {
    let record = state
        .db
        .find_tracking(&tracking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tracking ID not found".to_string()))?;

    if record.donor_id != auth.uid {
        return Err(AppError::Forbidden(
            "Only the donor can update tracking status".to_string(),
        ));
    }

    let new_status = TrackingStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid tracking status".to_string()))?;

    tracking::update_tracking_status(
        &state.db,
        &tracking_id,
        new_status,
        payload.notes.as_deref(),
        Some(&auth.uid),
    )
    .await?;

    if matches!(
        new_status,
        TrackingStatus::Completed | TrackingStatus::PickedUp
    ) {
        if let Some(mut reservation) = state.db.get_reservation(&record.reservation_id).await? {
            reservation.status = "picked_up".to_string();
            reservation.completed_at = Some(now_rfc3339());
            reservation.updated_at = now_rfc3339();
            state.db.update_reservation(&reservation).await?;
        }

        let mut item_name = "item".to_string();
        if let Some(mut item) = state.db.get_item(&record.item_id).await? {
            item_name = item.name.clone();
            if !item.is_bulk_item {
                item.status = "donated".to_string();
                item.updated_at = now_rfc3339();
                state.db.update_item(&item).await?;
            }
        }

        notify::create_notification(
            &state.db,
            "Item Delivered! 🎉",
            &format!(
                "The item '{}' has been marked as delivered. Thank you for donating!",
                item_name
            ),
            "item_delivered",
            vec![record.requester_id.clone()],
            false,
        )
        .await;
    }

    Ok(Json(ApiResponse::ok_empty(
        "Tracking status updated successfully",
    )))
}

/// Tracking records where the caller is the requester, with items joined.
#[utoipa::path(
    get,
    path = "/api/v1/user/tracking",
    responses((status = 200, description = "Tracking records", body = ApiResponse)),
    tag = "tracking",
    security(("bearer_auth" = []))
)]
pub async fn my_tracking(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut records = state.db.get_tracking_for_requester(&auth.uid).await?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut joined = Vec::with_capacity(records.len());
    for record in &records {
        let mut entry = serde_json::to_value(record)?;
        if let Some(item) = state.db.get_item(&record.item_id).await? {
            entry["item"] = serde_json::to_value(&item)?;
        }
        joined.push(entry);
    }

    Ok(Json(ApiResponse::ok(
        "User tracking records retrieved successfully",
        json!({ "tracking_records": joined }),
    )))
}

/// Tracking records where the caller is the donor, with items and requester
/// profiles joined.
#[utoipa::path(
    get,
    path = "/api/v1/donor/tracking",
    responses((status = 200, description = "Tracking records", body = ApiResponse)),
    tag = "tracking",
    security(("bearer_auth" = []))
)]
pub async fn donor_tracking(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse>> {
    let mut records = state.db.get_tracking_for_donor(&auth.uid).await?;
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut joined = Vec::with_capacity(records.len());
    for record in &records {
        let mut entry = serde_json::to_value(record)?;
        if let Some(item) = state.db.get_item(&record.item_id).await? {
            entry["item"] = serde_json::to_value(&item)?;
        }
        if let Some(requester) = state.db.get_user(&record.requester_id).await? {
            entry["requester"] = serde_json::to_value(&requester)?;
        }
        joined.push(entry);
    }

    Ok(Json(ApiResponse::ok(
        "Donor tracking records retrieved successfully",
        json!({ "tracking_records": joined }),
    )))
}
