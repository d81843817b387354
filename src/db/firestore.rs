// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, keyed by Firebase uid)
//! - Items and the likes/favorites join collections
//! - Reservations and tracking records
//! - Chats, messages, notifications and reports

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Chat, Favorite, Item, Like, Message, Notification, Report, Reservation, Tracking, User,
};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Whether a real Firestore client is attached.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic Helpers ─────────────────────────────────────────

    async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert<T>(&self, collection: &str, id: &str, obj: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(obj)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn list_all<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn query_eq<T>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let field = field.to_string();
        let value = value.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.field(&field).eq(value.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn query_eq2<T>(
        &self,
        collection: &str,
        first: (&str, &str),
        second: (&str, &str),
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let (f1, v1) = (first.0.to_string(), first.1.to_string());
        let (f2, v2) = (second.0.to_string(), second.1.to_string());
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                q.for_all([
                    q.field(&f1).eq(v1.clone()),
                    q.field(&f2).eq(v2.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    fn new_doc_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by Firebase uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_by_id(collections::USERS, uid).await
    }

    /// Create or update a user (document ID is the uid).
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.upsert(collections::USERS, &user.uid, user).await
    }

    /// All registered users (admin dashboard).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.list_all(collections::USERS).await
    }

    /// Delete a user profile document.
    pub async fn delete_user(&self, uid: &str) -> Result<(), AppError> {
        self.delete_doc(collections::USERS, uid).await
    }

    // ─── Item Operations ─────────────────────────────────────────

    pub async fn get_item(&self, item_id: &str) -> Result<Option<Item>, AppError> {
        self.get_by_id(collections::ITEMS, item_id).await
    }

    /// Store a new item, assigning and returning its document ID.
    pub async fn create_item(&self, item: &mut Item) -> Result<String, AppError> {
        item.id = Self::new_doc_id();
        self.upsert(collections::ITEMS, &item.id.clone(), item).await?;
        Ok(item.id.clone())
    }

    pub async fn update_item(&self, item: &Item) -> Result<(), AppError> {
        self.upsert(collections::ITEMS, &item.id, item).await
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        self.list_all(collections::ITEMS).await
    }

    pub async fn get_items_by_donor(&self, donor_id: &str) -> Result<Vec<Item>, AppError> {
        self.query_eq(collections::ITEMS, "donor_id", donor_id).await
    }

    /// Delete an item together with its reservations and likes/favorites
    /// join documents.
    pub async fn delete_item(&self, item_id: &str) -> Result<(), AppError> {
        let reservations = self.get_reservations_for_item(item_id).await?;
        self.batch_delete(&reservations, collections::RESERVATIONS, |r: &Reservation| {
            r.id.clone()
        })
        .await?;

        let likes: Vec<Like> = self.query_eq(collections::LIKES, "item_id", item_id).await?;
        self.batch_delete(&likes, collections::LIKES, |like: &Like| {
            format!("{}_{}", like.item_id, like.user_id)
        })
        .await?;

        let favorites: Vec<Favorite> = self
            .query_eq(collections::FAVORITES, "item_id", item_id)
            .await?;
        self.batch_delete(&favorites, collections::FAVORITES, |fav: &Favorite| {
            format!("{}_{}", fav.item_id, fav.user_id)
        })
        .await?;

        self.delete_doc(collections::ITEMS, item_id).await?;
        tracing::debug!(
            item_id,
            likes = likes.len(),
            favorites = favorites.len(),
            "Deleted item and join documents"
        );
        Ok(())
    }

    /// Delete many items concurrently (admin bulk delete).
    pub async fn delete_items(&self, item_ids: &[String]) -> Result<(), AppError> {
        stream::iter(item_ids.to_vec())
            .map(|item_id| async move { self.delete_item(&item_id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;
        Ok(())
    }

    // ─── Like / Favorite Operations ──────────────────────────────

    /// Likes and favorites use `{item_id}_{user_id}` as the document ID so
    /// duplicate marks are natural upsert conflicts rather than extra rows.
    fn join_doc_id(item_id: &str, user_id: &str) -> String {
        format!("{}_{}", item_id, user_id)
    }

    pub async fn get_like(&self, item_id: &str, user_id: &str) -> Result<Option<Like>, AppError> {
        self.get_by_id(collections::LIKES, &Self::join_doc_id(item_id, user_id))
            .await
    }

    pub async fn put_like(&self, like: &Like) -> Result<(), AppError> {
        self.upsert(
            collections::LIKES,
            &Self::join_doc_id(&like.item_id, &like.user_id),
            like,
        )
        .await
    }

    pub async fn delete_like(&self, item_id: &str, user_id: &str) -> Result<(), AppError> {
        self.delete_doc(collections::LIKES, &Self::join_doc_id(item_id, user_id))
            .await
    }

    pub async fn get_favorite(
        &self,
        item_id: &str,
        user_id: &str,
    ) -> Result<Option<Favorite>, AppError> {
        self.get_by_id(collections::FAVORITES, &Self::join_doc_id(item_id, user_id))
            .await
    }

    pub async fn put_favorite(&self, favorite: &Favorite) -> Result<(), AppError> {
        self.upsert(
            collections::FAVORITES,
            &Self::join_doc_id(&favorite.item_id, &favorite.user_id),
            favorite,
        )
        .await
    }

    pub async fn delete_favorite(&self, item_id: &str, user_id: &str) -> Result<(), AppError> {
        self.delete_doc(collections::FAVORITES, &Self::join_doc_id(item_id, user_id))
            .await
    }

    pub async fn get_favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, AppError> {
        self.query_eq(collections::FAVORITES, "user_id", user_id)
            .await
    }

    // ─── Reservation Operations ──────────────────────────────────

    pub async fn get_reservation(
        &self,
        reservation_id: &str,
    ) -> Result<Option<Reservation>, AppError> {
        self.get_by_id(collections::RESERVATIONS, reservation_id)
            .await
    }

    pub async fn create_reservation(
        &self,
        reservation: &mut Reservation,
    ) -> Result<String, AppError> {
        reservation.id = Self::new_doc_id();
        self.upsert(collections::RESERVATIONS, &reservation.id.clone(), reservation)
            .await?;
        Ok(reservation.id.clone())
    }

    pub async fn update_reservation(&self, reservation: &Reservation) -> Result<(), AppError> {
        self.upsert(collections::RESERVATIONS, &reservation.id, reservation)
            .await
    }

    /// Every reservation in the system (admin analytics).
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, AppError> {
        self.list_all(collections::RESERVATIONS).await
    }

    pub async fn get_reservations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Reservation>, AppError> {
        self.query_eq(collections::RESERVATIONS, "user_id", user_id)
            .await
    }

    pub async fn get_reservations_for_donor(
        &self,
        donor_id: &str,
    ) -> Result<Vec<Reservation>, AppError> {
        self.query_eq(collections::RESERVATIONS, "donor_id", donor_id)
            .await
    }

    pub async fn get_reservations_for_item(
        &self,
        item_id: &str,
    ) -> Result<Vec<Reservation>, AppError> {
        self.query_eq(collections::RESERVATIONS, "item_id", item_id)
            .await
    }

    /// Pending reservations competing for an item.
    pub async fn get_pending_reservations_for_item(
        &self,
        item_id: &str,
    ) -> Result<Vec<Reservation>, AppError> {
        self.query_eq2(
            collections::RESERVATIONS,
            ("item_id", item_id),
            ("status", "pending"),
        )
        .await
    }

    // ─── Chat Operations ─────────────────────────────────────────

    pub async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, AppError> {
        self.get_by_id(collections::CHATS, chat_id).await
    }

    pub async fn create_chat(&self, chat: &mut Chat) -> Result<String, AppError> {
        chat.id = Self::new_doc_id();
        self.upsert(collections::CHATS, &chat.id.clone(), chat).await?;
        Ok(chat.id.clone())
    }

    pub async fn update_chat(&self, chat: &Chat) -> Result<(), AppError> {
        self.upsert(collections::CHATS, &chat.id, chat).await
    }

    /// All chats in which this user participates, as donor or requester.
    pub async fn get_chats_for_user(&self, uid: &str) -> Result<Vec<Chat>, AppError> {
        let mut chats: Vec<Chat> = self.query_eq(collections::CHATS, "donor_id", uid).await?;
        let as_requester: Vec<Chat> = self
            .query_eq(collections::CHATS, "requester_id", uid)
            .await?;
        chats.extend(as_requester);
        Ok(chats)
    }

    /// Existing chat room for an (item, requester, donor) triple, if any.
    pub async fn find_chat(
        &self,
        item_id: &str,
        requester_id: &str,
        donor_id: &str,
    ) -> Result<Option<Chat>, AppError> {
        let chats: Vec<Chat> = self
            .query_eq2(
                collections::CHATS,
                ("item_id", item_id),
                ("requester_id", requester_id),
            )
            .await?;
        Ok(chats.into_iter().find(|c| c.donor_id == donor_id))
    }

    // ─── Message Operations ──────────────────────────────────────

    pub async fn create_message(&self, message: &mut Message) -> Result<String, AppError> {
        message.id = Self::new_doc_id();
        self.upsert(collections::MESSAGES, &message.id.clone(), message)
            .await?;
        Ok(message.id.clone())
    }

    pub async fn get_messages_for_chat(&self, chat_id: &str) -> Result<Vec<Message>, AppError> {
        let mut messages: Vec<Message> = self
            .query_eq(collections::MESSAGES, "chat_id", chat_id)
            .await?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    pub async fn update_message(&self, message: &Message) -> Result<(), AppError> {
        self.upsert(collections::MESSAGES, &message.id, message).await
    }

    /// Messages in this chat sent by someone else and not yet read.
    pub async fn get_unread_messages(
        &self,
        chat_id: &str,
        reader_uid: &str,
    ) -> Result<Vec<Message>, AppError> {
        let messages = self.get_messages_for_chat(chat_id).await?;
        Ok(messages
            .into_iter()
            .filter(|m| !m.read && m.sender_id != reader_uid)
            .collect())
    }

    /// Total unread messages across every chat this user participates in.
    pub async fn unread_messages_count(&self, uid: &str) -> Result<usize, AppError> {
        let chats = self.get_chats_for_user(uid).await?;
        let mut count = 0;
        for chat in &chats {
            count += self.get_unread_messages(&chat.id, uid).await?.len();
        }
        Ok(count)
    }

    // ─── Notification Operations ─────────────────────────────────

    pub async fn get_notification(
        &self,
        collection: &str,
        notification_id: &str,
    ) -> Result<Option<Notification>, AppError> {
        self.get_by_id(collection, notification_id).await
    }

    pub async fn create_notification(
        &self,
        collection: &str,
        notification: &mut Notification,
    ) -> Result<String, AppError> {
        notification.id = Self::new_doc_id();
        self.upsert(collection, &notification.id.clone(), notification)
            .await?;
        Ok(notification.id.clone())
    }

    pub async fn update_notification(
        &self,
        collection: &str,
        notification: &Notification,
    ) -> Result<(), AppError> {
        self.upsert(collection, &notification.id, notification).await
    }

    pub async fn delete_notification(
        &self,
        collection: &str,
        notification_id: &str,
    ) -> Result<(), AppError> {
        self.delete_doc(collection, notification_id).await
    }

    /// Full notification feed. Target filtering happens in memory because
    /// broadcasts (empty target lists) and targeted rows live side by side.
    pub async fn list_notifications(&self, collection: &str) -> Result<Vec<Notification>, AppError> {
        self.list_all(collection).await
    }

    /// Notifications visible to a user, newest first.
    pub async fn notifications_for_user(&self, uid: &str) -> Result<Vec<Notification>, AppError> {
        let mut notifications: Vec<Notification> = self
            .list_notifications(collections::NOTIFICATIONS)
            .await?
            .into_iter()
            .filter(|n| n.visible_to(uid))
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    // ─── Tracking Operations ─────────────────────────────────────

    pub async fn create_tracking(&self, tracking: &mut Tracking) -> Result<String, AppError> {
        tracking.id = Self::new_doc_id();
        self.upsert(collections::TRACKING, &tracking.id.clone(), tracking)
            .await?;
        Ok(tracking.id.clone())
    }

    pub async fn update_tracking(&self, tracking: &Tracking) -> Result<(), AppError> {
        self.upsert(collections::TRACKING, &tracking.id, tracking)
            .await
    }

    /// Look up a tracking record by its human-facing code.
    pub async fn find_tracking(&self, tracking_id: &str) -> Result<Option<Tracking>, AppError> {
        let records: Vec<Tracking> = self
            .query_eq(collections::TRACKING, "tracking_id", tracking_id)
            .await?;
        Ok(records.into_iter().next())
    }

    pub async fn find_tracking_for_reservation(
        &self,
        reservation_id: &str,
    ) -> Result<Option<Tracking>, AppError> {
        let records: Vec<Tracking> = self
            .query_eq(collections::TRACKING, "reservation_id", reservation_id)
            .await?;
        Ok(records.into_iter().next())
    }

    pub async fn get_tracking_for_requester(
        &self,
        requester_id: &str,
    ) -> Result<Vec<Tracking>, AppError> {
        self.query_eq(collections::TRACKING, "requester_id", requester_id)
            .await
    }

    pub async fn get_tracking_for_donor(&self, donor_id: &str) -> Result<Vec<Tracking>, AppError> {
        self.query_eq(collections::TRACKING, "donor_id", donor_id)
            .await
    }

    // ─── Report Operations ───────────────────────────────────────

    pub async fn create_report(&self, report: &mut Report) -> Result<String, AppError> {
        report.id = Self::new_doc_id();
        self.upsert(collections::REPORTS, &report.id.clone(), report)
            .await?;
        Ok(report.id.clone())
    }

    pub async fn get_report(&self, report_id: &str) -> Result<Option<Report>, AppError> {
        self.get_by_id(collections::REPORTS, report_id).await
    }

    pub async fn update_report(&self, report: &Report) -> Result<(), AppError> {
        self.upsert(collections::REPORTS, &report.id, report).await
    }

    pub async fn list_reports(&self) -> Result<Vec<Report>, AppError> {
        self.list_all(collections::REPORTS).await
    }

    // ─── User Data Deletion ──────────────────────────────────────

    /// Delete a user's profile and every document referencing them.
    ///
    /// Items they donated are removed together with the likes and favorites
    /// pointing at those items. Reservations, chats, tracking records and
    /// join documents naming the user directly are removed as well.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, uid: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Items donated by the user (cascades their likes/favorites)
        let items = self.get_items_by_donor(uid).await?;
        for item in &items {
            self.delete_item(&item.id).await?;
        }
        deleted_count += items.len();
        tracing::debug!(uid, count = items.len(), "Deleted donated items");

        // 2. Reservations on either side
        let mut reservations = self.get_reservations_for_user(uid).await?;
        reservations.extend(self.get_reservations_for_donor(uid).await?);
        let count = reservations.len();
        self.batch_delete(&reservations, collections::RESERVATIONS, |r: &Reservation| {
            r.id.clone()
        })
        .await?;
        deleted_count += count;
        tracing::debug!(uid, count, "Deleted reservations");

        // 3. Chats and their messages
        let chats = self.get_chats_for_user(uid).await?;
        for chat in &chats {
            let messages = self.get_messages_for_chat(&chat.id).await?;
            deleted_count += messages.len();
            self.batch_delete(&messages, collections::MESSAGES, |m: &Message| m.id.clone())
                .await?;
        }
        let count = chats.len();
        self.batch_delete(&chats, collections::CHATS, |c: &Chat| c.id.clone())
            .await?;
        deleted_count += count;
        tracing::debug!(uid, count, "Deleted chats");

        // 4. Tracking records on either side
        let mut tracking = self.get_tracking_for_requester(uid).await?;
        tracking.extend(self.get_tracking_for_donor(uid).await?);
        let count = tracking.len();
        self.batch_delete(&tracking, collections::TRACKING, |t: &Tracking| t.id.clone())
            .await?;
        deleted_count += count;

        // 5. Likes and favorites placed by the user
        let likes: Vec<Like> = self.query_eq(collections::LIKES, "user_id", uid).await?;
        deleted_count += likes.len();
        self.batch_delete(&likes, collections::LIKES, |l: &Like| {
            Self::join_doc_id(&l.item_id, &l.user_id)
        })
        .await?;

        let favorites = self.get_favorites_for_user(uid).await?;
        deleted_count += favorites.len();
        self.batch_delete(&favorites, collections::FAVORITES, |f: &Favorite| {
            Self::join_doc_id(&f.item_id, &f.user_id)
        })
        .await?;

        // 6. User profile
        self.delete_user(uid).await?;
        deleted_count += 1;

        tracing::info!(uid, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
