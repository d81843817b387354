// SPDX-License-Identifier: MIT

//! Donation tracking model and the fixed status catalogue.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a tracked donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    RequestSubmitted,
    RequestAccepted,
    PreparingItem,
    PackingCompleted,
    ReadyForPickup,
    PickedUp,
    Completed,
    Cancelled,
}

impl TrackingStatus {
    pub const ALL: [TrackingStatus; 8] = [
        TrackingStatus::RequestSubmitted,
        TrackingStatus::RequestAccepted,
        TrackingStatus::PreparingItem,
        TrackingStatus::PackingCompleted,
        TrackingStatus::ReadyForPickup,
        TrackingStatus::PickedUp,
        TrackingStatus::Completed,
        TrackingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::RequestSubmitted => "request_submitted",
            TrackingStatus::RequestAccepted => "request_accepted",
            TrackingStatus::PreparingItem => "preparing_item",
            TrackingStatus::PackingCompleted => "packing_completed",
            TrackingStatus::ReadyForPickup => "ready_for_pickup",
            TrackingStatus::PickedUp => "picked_up",
            TrackingStatus::Completed => "completed",
            TrackingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackingStatus::RequestSubmitted => "Request Submitted",
            TrackingStatus::RequestAccepted => "Request Accepted",
            TrackingStatus::PreparingItem => "Preparing Item",
            TrackingStatus::PackingCompleted => "Packing Completed",
            TrackingStatus::ReadyForPickup => "Ready for Pickup",
            TrackingStatus::PickedUp => "Item Picked Up",
            TrackingStatus::Completed => "Completed",
            TrackingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TrackingStatus::RequestSubmitted => "Your request has been submitted to the donor",
            TrackingStatus::RequestAccepted => "Great! The donor has accepted your request",
            TrackingStatus::PreparingItem => "The donor is preparing your item",
            TrackingStatus::PackingCompleted => "Your item has been packed and is ready",
            TrackingStatus::ReadyForPickup => {
                "Your item is ready for pickup! Contact the donor to arrange collection"
            }
            TrackingStatus::PickedUp => "Item has been successfully picked up",
            TrackingStatus::Completed => "Transaction completed successfully",
            TrackingStatus::Cancelled => "The request has been cancelled",
        }
    }

    /// Material icon name shown by the clients.
    pub fn icon(&self) -> &'static str {
        match self {
            TrackingStatus::RequestSubmitted => "send",
            TrackingStatus::RequestAccepted => "check_circle",
            TrackingStatus::PreparingItem => "inventory",
            TrackingStatus::PackingCompleted => "package",
            TrackingStatus::ReadyForPickup => "local_shipping",
            TrackingStatus::PickedUp => "done_all",
            TrackingStatus::Completed => "celebration",
            TrackingStatus::Cancelled => "cancel",
        }
    }

    /// The full catalogue as `{status: {title, description, icon}}`, shipped
    /// to clients alongside tracking records.
    pub fn catalogue() -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for status in Self::ALL {
            map.insert(
                status.as_str().to_string(),
                serde_json::json!({
                    "title": status.title(),
                    "description": status.description(),
                    "icon": status.icon(),
                }),
            );
        }
        serde_json::Value::Object(map)
    }
}

/// One entry in a tracking record's status history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusEntry {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Tracking record created when a reservation is approved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Tracking {
    #[serde(default)]
    pub id: String,
    /// Human-facing code, e.g. `SC260829A1B2C3`
    pub tracking_id: String,
    pub reservation_id: String,
    pub item_id: String,
    pub donor_id: String,
    pub requester_id: String,
    pub current_status: String,
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in TrackingStatus::ALL {
            assert_eq!(TrackingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TrackingStatus::parse("shipped"), None);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_value(TrackingStatus::ReadyForPickup).unwrap();
        assert_eq!(json, "ready_for_pickup");
    }

    #[test]
    fn test_catalogue_covers_all_statuses() {
        let catalogue = TrackingStatus::catalogue();
        let map = catalogue.as_object().unwrap();
        assert_eq!(map.len(), 8);
        assert_eq!(map["picked_up"]["icon"], "done_all");
        assert_eq!(map["request_accepted"]["title"], "Request Accepted");
    }
}
