// SPDX-License-Identifier: MIT

//! Notification model shared by the user and admin feeds.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Notification document.
///
/// An empty `target_users` list means a broadcast visible to everyone.
/// Per-user read state lives in `read_by`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub target_users: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub read_by: Vec<String>,
    #[serde(default)]
    pub read_at: Option<String>,
}

impl Notification {
    /// Whether this notification is visible to the given user.
    pub fn visible_to(&self, uid: &str) -> bool {
        self.target_users.is_empty() || self.target_users.iter().any(|u| u == uid)
    }

    pub fn is_read_by(&self, uid: &str) -> bool {
        self.read_by.iter().any(|u| u == uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(targets: Vec<&str>) -> Notification {
        Notification {
            id: "n1".into(),
            title: "t".into(),
            message: "m".into(),
            kind: "system".into(),
            target_users: targets.into_iter().map(String::from).collect(),
            created_at: "2026-01-01T00:00:00Z".into(),
            read_by: vec!["u2".into()],
            read_at: None,
        }
    }

    #[test]
    fn test_broadcast_is_visible_to_everyone() {
        let n = sample(vec![]);
        assert!(n.visible_to("u1"));
        assert!(n.visible_to("u2"));
    }

    #[test]
    fn test_targeted_visibility() {
        let n = sample(vec!["u1"]);
        assert!(n.visible_to("u1"));
        assert!(!n.visible_to("u3"));
    }

    #[test]
    fn test_read_state_is_per_user() {
        let n = sample(vec![]);
        assert!(n.is_read_by("u2"));
        assert!(!n.is_read_by("u1"));
    }

    #[test]
    fn test_type_field_rename() {
        let json = serde_json::to_value(sample(vec![])).unwrap();
        assert_eq!(json["type"], "system");
    }
}
