// SPDX-License-Identifier: MIT

//! OpenAPI documentation, served at `/docs` (Swagger UI) and `/redoc`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models;
use crate::routes::{admin, auth, chats, items, notifications, reservations, tracking, uploads, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::verify_token,
        auth::admin_login,
        // Users
        users::create_user,
        users::get_profile,
        users::update_profile,
        users::get_user,
        users::get_user_status,
        users::update_my_status,
        // Uploads
        uploads::upload_file,
        // Items
        items::list_items,
        items::create_item,
        items::search_items,
        items::items_by_category,
        items::get_item,
        items::update_item,
        items::delete_item,
        items::add_item_images,
        items::like_item,
        items::unlike_item,
        items::favorite_item,
        items::unfavorite_item,
        items::report_item,
        items::item_requests,
        items::my_donations,
        items::my_favorites,
        // Reservations
        reservations::create_reservation,
        reservations::reserve_item,
        reservations::get_reservation,
        reservations::cancel_reservation,
        reservations::update_reservation_status,
        reservations::mark_picked_up,
        reservations::my_reservations,
        reservations::my_pickups,
        reservations::donor_reservations,
        // Tracking
        tracking::get_tracking_info,
        tracking::update_tracking_status,
        tracking::my_tracking,
        tracking::donor_tracking,
        // Chats
        chats::list_chats,
        chats::get_messages,
        chats::send_message,
        chats::send_image_message,
        chats::mark_messages_read,
        // Notifications
        notifications::list_notifications,
        notifications::get_notification,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        // Admin
        admin::get_profile,
        admin::update_profile,
        admin::logout,
        admin::list_users,
        admin::update_user_status,
        admin::delete_user,
        admin::user_items,
        admin::statistics,
        admin::list_items,
        admin::item_details,
        admin::update_item,
        admin::verify_item,
        admin::delete_item,
        admin::bulk_delete_items,
        admin::list_notifications,
        admin::notification_details,
        admin::create_notification,
        admin::resend_notification,
        admin::delete_notification,
        admin::resolve_report,
        admin::demand_areas,
    ),
    components(
        schemas(
            models::ApiResponse,
            models::User,
            models::Item,
            models::DonorInfo,
            models::Location,
            models::Reservation,
            models::ItemSnapshot,
            models::Like,
            models::Favorite,
            models::Chat,
            models::Message,
            models::Notification,
            models::Report,
            models::Tracking,
            models::TrackingStatus,
            models::StatusEntry,
            auth::VerifyTokenRequest,
            auth::AdminLoginRequest,
            users::CreateUserRequest,
            users::UpdateProfileRequest,
            users::UpdateStatusForm,
            items::CreateItemRequest,
            items::UpdateItemRequest,
            items::ReportItemRequest,
            reservations::ReservationRequest,
            reservations::ReserveForm,
            reservations::ReservationStatusForm,
            reservations::PickupForm,
            tracking::UpdateTrackingStatusRequest,
            chats::SendMessageForm,
            admin::UpdateAdminProfileRequest,
            admin::UpdateUserStatusRequest,
            admin::AdminUpdateItemRequest,
            admin::VerifyItemRequest,
            admin::BulkDeleteItemsRequest,
            admin::NotificationRequest,
            admin::ResendNotificationRequest,
        )
    ),
    tags(
        (name = "auth", description = "Firebase token verification and admin login"),
        (name = "users", description = "User profiles and presence"),
        (name = "uploads", description = "Image uploads"),
        (name = "items", description = "Donation items, likes, favorites and reports"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "tracking", description = "Donation tracking"),
        (name = "chats", description = "Donor and requester chat"),
        (name = "notifications", description = "User notification feed"),
        (name = "admin", description = "Admin dashboard"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "ShareCare: Food & Clothes Connect API",
        description = "Backend API for the ShareCare donation platform",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
