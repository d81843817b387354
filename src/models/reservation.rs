// SPDX-License-Identifier: MIT

//! Reservation, like and favorite models.

use crate::models::item::Location;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Item snapshot embedded in a reservation when it is created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub pickup_times: String,
}

/// Reservation request from one user for another user's item.
///
/// Status is one of "pending", "approved", "declined", "cancelled" or
/// "picked_up" in storage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    #[serde(default)]
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub user_id: String,
    pub user_name: String,
    pub donor_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_quantity")]
    pub requested_quantity: i64,
    pub status: String,
    #[serde(default)]
    pub location: Option<Location>,
    pub created_at: String,
    pub updated_at: String,
    /// Set once the donor approves
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub cancelled_at: Option<String>,
    #[serde(default)]
    pub picked_up_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub item: Option<ItemSnapshot>,
}

fn default_quantity() -> i64 {
    1
}

/// One like, keyed by (item_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Like {
    pub item_id: String,
    pub user_id: String,
    pub created_at: String,
}

/// One favorite, keyed by (item_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Favorite {
    pub item_id: String,
    pub user_id: String,
    pub created_at: String,
}
