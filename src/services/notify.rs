// SPDX-License-Identifier: MIT

//! Notification creation helper.

use crate::db::{collections, FirestoreDb};
use crate::models::Notification;
use crate::time_utils::now_rfc3339;

/// Write a notification document.
///
/// Admin notifications land in their own collection so the dashboard feed
/// stays separate from the user feed. An empty `target_users` list makes the
/// notification a broadcast. Failures are logged, never propagated: a missing
/// notification must not fail the request that produced it.
pub async fn create_notification(
    db: &FirestoreDb,
    title: &str,
    message: &str,
    kind: &str,
    target_users: Vec<String>,
    is_admin_notification: bool,
) {
    let mut notification = Notification {
        id: String::new(),
        title: title.to_string(),
        message: message.to_string(),
        kind: kind.to_string(),
        target_users,
        created_at: now_rfc3339(),
        read_by: Vec::new(),
        read_at: None,
    };

    let collection = if is_admin_notification {
        collections::ADMIN_NOTIFICATIONS
    } else {
        collections::NOTIFICATIONS
    };

    match db.create_notification(collection, &mut notification).await {
        Ok(_) => tracing::info!(title, collection, "Notification created"),
        Err(e) => tracing::error!(title, error = %e, "Failed to create notification"),
    }
}
