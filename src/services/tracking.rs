// SPDX-License-Identifier: MIT

//! Tracking record lifecycle: ID generation, creation on approval, and
//! status updates that notify the requester.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{StatusEntry, Tracking, TrackingStatus};
use crate::services::notify;
use crate::time_utils::now_rfc3339;
use ring::rand::{SecureRandom, SystemRandom};

const TRACKING_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TRACKING_ID_RANDOM_LEN: usize = 6;

/// Generate a tracking code: `SC` + YYMMDD + 6 random uppercase
/// alphanumerics, e.g. `SC260829A1B2C3`.
pub fn generate_tracking_id() -> Result<String, AppError> {
    let mut bytes = [0u8; TRACKING_ID_RANDOM_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Database("Failed to generate tracking ID".to_string()))?;

    let random_part: String = bytes
        .iter()
        .map(|b| TRACKING_ID_CHARSET[*b as usize % TRACKING_ID_CHARSET.len()] as char)
        .collect();

    let date_part = chrono::Utc::now().format("%y%m%d");
    Ok(format!("SC{}{}", date_part, random_part))
}

/// Create a tracking record for a freshly approved reservation.
///
/// The history starts with two entries: the submission (attributed to the
/// requester) and the acceptance (attributed to the donor). Returns the
/// human-facing tracking code.
pub async fn create_tracking_record(
    db: &FirestoreDb,
    reservation_id: &str,
    item_id: &str,
    donor_id: &str,
    requester_id: &str,
) -> Result<String, AppError> {
    let tracking_id = generate_tracking_id()?;
    let now = now_rfc3339();

    let mut tracking = Tracking {
        id: String::new(),
        tracking_id: tracking_id.clone(),
        reservation_id: reservation_id.to_string(),
        item_id: item_id.to_string(),
        donor_id: donor_id.to_string(),
        requester_id: requester_id.to_string(),
        current_status: TrackingStatus::RequestAccepted.as_str().to_string(),
        status_history: vec![
            StatusEntry {
                status: TrackingStatus::RequestSubmitted.as_str().to_string(),
                timestamp: now.clone(),
                notes: "Request submitted to donor".to_string(),
                updated_by: Some(requester_id.to_string()),
            },
            StatusEntry {
                status: TrackingStatus::RequestAccepted.as_str().to_string(),
                timestamp: now.clone(),
                notes: "Request accepted by donor".to_string(),
                updated_by: Some(donor_id.to_string()),
            },
        ],
        created_at: now.clone(),
        updated_at: now,
    };

    db.create_tracking(&mut tracking).await?;
    tracing::info!(tracking_id = %tracking_id, reservation_id, "Tracking record created");

    Ok(tracking_id)
}

/// Append a status to a tracking record's history and notify the requester.
pub async fn update_tracking_status(
    db: &FirestoreDb,
    tracking_id: &str,
    new_status: TrackingStatus,
    notes: Option<&str>,
    updated_by: Option<&str>,
) -> Result<Tracking, AppError> {
    let mut tracking = db
        .find_tracking(tracking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tracking record not found".to_string()))?;

    tracking.status_history.push(StatusEntry {
        status: new_status.as_str().to_string(),
        timestamp: now_rfc3339(),
        notes: notes.unwrap_or_else(|| new_status.description()).to_string(),
        updated_by: updated_by.map(String::from),
    });
    tracking.current_status = new_status.as_str().to_string();
    tracking.updated_at = now_rfc3339();

    db.update_tracking(&tracking).await?;

    notify::create_notification(
        db,
        new_status.title(),
        &format!("Tracking ID: {} - {}", tracking_id, new_status.description()),
        "tracking_update",
        vec![tracking.requester_id.clone()],
        false,
    )
    .await;

    tracing::info!(tracking_id, status = new_status.as_str(), "Tracking status updated");

    Ok(tracking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_id_format() {
        let id = generate_tracking_id().unwrap();
        assert_eq!(id.len(), 2 + 6 + 6);
        assert!(id.starts_with("SC"));

        let date_part = &id[2..8];
        assert!(date_part.chars().all(|c| c.is_ascii_digit()));

        let random_part = &id[8..];
        assert!(random_part
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_tracking_ids_differ() {
        let a = generate_tracking_id().unwrap();
        let b = generate_tracking_id().unwrap();
        // Same date prefix, random suffixes should differ
        assert_eq!(a[..8], b[..8]);
        assert_ne!(a, b);
    }
}
