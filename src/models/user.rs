//! User model for storage and API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User profile stored in Firestore (document ID is the Firebase uid).
///
/// Two fields keep the camelCase spelling the mobile clients already send.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Firebase uid (also used as document ID)
    pub uid: String,
    /// Email address
    pub email: String,
    /// Display name
    pub full_name: String,
    #[serde(default)]
    pub email_verified: bool,
    /// Profile picture URL
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Aggregate donor rating
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// "individual" or "organization"
    #[serde(default = "default_account_type")]
    pub account_type: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    /// Last time the client reported activity (online window is 2 minutes)
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    /// Chat ID the user is currently typing in, if any
    #[serde(default)]
    pub typing_in_chat: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_account_type() -> String {
    "individual".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_field_renames() {
        let json = serde_json::json!({
            "uid": "u1",
            "email": "a@b.c",
            "full_name": "Ada",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z",
            "phoneNumber": "+12025550000",
            "isAdmin": true
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.phone_number, "+12025550000");
        assert!(user.is_admin);
        assert!(user.is_active);
        assert_eq!(user.account_type, "individual");

        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("phoneNumber").is_some());
        assert!(out.get("isAdmin").is_some());
    }
}
