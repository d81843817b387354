// SPDX-License-Identifier: MIT

//! Item report model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User-filed report against an item. Status is "pending" until an
/// administrator resolves it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    #[serde(default)]
    pub id: String,
    pub item_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub resolved_by: Option<String>,
}
