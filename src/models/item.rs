// SPDX-License-Identifier: MIT

//! Donated item model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pickup location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub address: String,
}

/// Denormalized donor snapshot embedded in each item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonorInfo {
    pub id: String,
    pub name: String,
    /// Account type ("individual" or "organization")
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Donated item stored in Firestore.
///
/// `status` is a free string in storage ("available", "reserved",
/// "completed", "expired") so documents written by older clients still load.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub food_type: Option<String>,
    /// Bulk items track a remaining quantity instead of a single reservation
    #[serde(default)]
    pub is_bulk_item: bool,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub donor: DonorInfo,
    pub donor_id: String,
    pub donor_name: String,
    pub location: Location,
    pub pickup_times: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub is_for_sale: bool,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

fn default_quantity() -> i64 {
    1
}

fn default_status() -> String {
    "available".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donor_type_rename() {
        let donor = DonorInfo {
            id: "u1".into(),
            name: "Ada".into(),
            account_type: "organization".into(),
            rating: 4.5,
            photo_url: None,
            phone: String::new(),
            email: String::new(),
        };
        let json = serde_json::to_value(&donor).unwrap();
        assert_eq!(json["type"], "organization");
    }

    #[test]
    fn test_item_defaults_tolerate_sparse_documents() {
        let json = serde_json::json!({
            "name": "Rice",
            "description": "5kg bag",
            "category": "food",
            "donor": {"id": "u1", "name": "Ada", "type": "individual"},
            "donor_id": "u1",
            "donor_name": "Ada",
            "location": {"latitude": 1.0, "longitude": 2.0, "address": "Main St"},
            "pickup_times": "weekends",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        });
        let item: Item = serde_json::from_value(json).unwrap();
        assert_eq!(item.status, "available");
        assert_eq!(item.quantity, 1);
        assert!(!item.is_verified);
        assert!(item.images.is_empty());
    }
}
