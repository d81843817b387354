// SPDX-License-Identifier: MIT

//! Chat room and message models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chat room between a donor and a requester, created when a reservation is
/// approved. At most one room exists per (item, requester, donor) triple.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    pub reservation_id: String,
    pub item_id: String,
    pub donor_id: String,
    pub requester_id: String,
    pub created_at: String,
    pub last_message_at: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Message inside a chat room. Image messages carry the storage URL in
/// `image_url` alongside a placeholder text.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub message: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub read: bool,
}
