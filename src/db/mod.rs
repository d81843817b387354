//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ITEMS: &str = "items";
    pub const RESERVATIONS: &str = "reservations";
    /// Likes and favorites are keyed by `{item_id}_{user_id}`
    pub const LIKES: &str = "likes";
    pub const FAVORITES: &str = "favorites";
    pub const CHATS: &str = "chats";
    pub const MESSAGES: &str = "messages";
    pub const NOTIFICATIONS: &str = "notifications";
    /// Separate feed for the admin dashboard
    pub const ADMIN_NOTIFICATIONS: &str = "admin-notifications";
    pub const TRACKING: &str = "tracking";
    pub const REPORTS: &str = "reports";
}
