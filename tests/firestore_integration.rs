// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST). The emulator provides a clean
//! state for each test run.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use sharecare_api::models::{DonorInfo, Item, Like, Location, Reservation, User};
use sharecare_api::time_utils::now_rfc3339;
use tower::ServiceExt;

mod common;
use common::test_db;

/// Generate a unique suffix for test isolation.
fn unique_suffix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

fn test_user(uid: &str) -> User {
    let now = now_rfc3339();
    User {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        full_name: "Test User".to_string(),
        email_verified: true,
        photo_url: None,
        rating: 0.0,
        is_active: true,
        account_type: "individual".to_string(),
        phone_number: String::new(),
        address: "not available".to_string(),
        bio: "not available".to_string(),
        is_admin: false,
        created_at: now.clone(),
        updated_at: now,
        last_seen: None,
        is_online: false,
        typing_in_chat: None,
    }
}

fn test_item(donor_uid: &str) -> Item {
    let now = now_rfc3339();
    Item {
        id: String::new(),
        name: "Fresh Bread".to_string(),
        description: "A dozen sourdough loaves".to_string(),
        category: "food".to_string(),
        food_type: Some("bakery".to_string()),
        is_bulk_item: false,
        quantity: 1,
        donor: DonorInfo {
            id: donor_uid.to_string(),
            name: "Test User".to_string(),
            account_type: "individual".to_string(),
            rating: 0.0,
            photo_url: None,
            phone: String::new(),
            email: format!("{}@example.com", donor_uid),
        },
        donor_id: donor_uid.to_string(),
        donor_name: "Test User".to_string(),
        location: Location {
            latitude: 52.3702,
            longitude: 4.8952,
            address: "Amsterdam".to_string(),
        },
        pickup_times: "weekday evenings".to_string(),
        expiry_date: None,
        is_for_sale: false,
        price: 0.0,
        images: vec![],
        status: "available".to_string(),
        is_verified: false,
        likes: 0,
        views: 0,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn pending_reservation(item: &Item, requester: &str, quantity: i64) -> Reservation {
    let now = now_rfc3339();
    Reservation {
        id: String::new(),
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        user_id: requester.to_string(),
        user_name: "Test Requester".to_string(),
        donor_id: item.donor_id.clone(),
        message: None,
        requested_quantity: quantity,
        status: "pending".to_string(),
        location: None,
        item: None,
        tracking_id: None,
        picked_up_at: None,
        cancelled_at: None,
        completed_at: None,
        created_at: now.clone(),
        updated_at: now,
    }
}

fn approve_request(reservation_id: &str, donor_uid: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/reservations/{}/status", reservation_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", donor_uid))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("status=approved"))
        .unwrap()
}

#[tokio::test]
async fn test_user_crud() {
    require_emulator!();

    let db = test_db().await;
    let uid = format!("user-{}", unique_suffix());

    let before = db.get_user(&uid).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    let user = test_user(&uid);
    db.upsert_user(&user).await.unwrap();

    let fetched = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(fetched.uid, uid);
    assert_eq!(fetched.full_name, "Test User");
    assert!(fetched.is_active);

    let mut updated = fetched;
    updated.full_name = "Renamed User".to_string();
    db.upsert_user(&updated).await.unwrap();

    let after = db.get_user(&uid).await.unwrap().unwrap();
    assert_eq!(after.full_name, "Renamed User");

    println!("✓ User CRUD verified: uid={}", uid);
}

#[tokio::test]
async fn test_item_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let donor = format!("donor-{}", unique_suffix());
    db.upsert_user(&test_user(&donor)).await.unwrap();

    let mut item = test_item(&donor);
    db.create_item(&mut item).await.unwrap();
    assert!(!item.id.is_empty(), "create_item should assign an id");

    let fetched = db.get_item(&item.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Fresh Bread");
    assert_eq!(fetched.status, "available");

    let mut reserved = fetched;
    reserved.status = "reserved".to_string();
    db.update_item(&reserved).await.unwrap();

    let by_donor = db.get_items_by_donor(&donor).await.unwrap();
    assert_eq!(by_donor.len(), 1);
    assert_eq!(by_donor[0].status, "reserved");

    println!("✓ Item lifecycle verified: item_id={}", item.id);
}

#[tokio::test]
async fn test_like_uniqueness_per_user() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let donor = format!("donor-{}", suffix);
    let liker = format!("liker-{}", suffix);

    let mut item = test_item(&donor);
    db.create_item(&mut item).await.unwrap();

    let before = db.get_like(&item.id, &liker).await.unwrap();
    assert!(before.is_none());

    let like = Like {
        item_id: item.id.clone(),
        user_id: liker.clone(),
        created_at: now_rfc3339(),
    };
    db.put_like(&like).await.unwrap();
    let after = db.get_like(&item.id, &liker).await.unwrap();
    assert!(after.is_some(), "Like should exist after put_like");

    // A second put overwrites the same composite document
    db.put_like(&like).await.unwrap();
    let still = db.get_like(&item.id, &liker).await.unwrap();
    assert!(still.is_some());

    db.delete_like(&item.id, &liker).await.unwrap();
    let gone = db.get_like(&item.id, &liker).await.unwrap();
    assert!(gone.is_none(), "Like should be removed");

    println!("✓ Like uniqueness verified: item_id={}", item.id);
}

#[tokio::test]
async fn test_reservation_queries() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let donor = format!("donor-{}", suffix);
    let requester = format!("requester-{}", suffix);

    let mut item = test_item(&donor);
    db.create_item(&mut item).await.unwrap();

    let now = now_rfc3339();
    let mut reservation = Reservation {
        id: String::new(),
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        user_id: requester.clone(),
        user_name: "Test Requester".to_string(),
        donor_id: donor.clone(),
        message: Some("Can I pick this up tonight?".to_string()),
        requested_quantity: 1,
        status: "pending".to_string(),
        location: Some(item.location.clone()),
        item: None,
        tracking_id: None,
        picked_up_at: None,
        cancelled_at: None,
        completed_at: None,
        created_at: now.clone(),
        updated_at: now,
    };
    db.create_reservation(&mut reservation).await.unwrap();
    assert!(!reservation.id.is_empty());

    let for_user = db.get_reservations_for_user(&requester).await.unwrap();
    assert_eq!(for_user.len(), 1);
    assert_eq!(for_user[0].item_id, item.id);

    let for_donor = db.get_reservations_for_donor(&donor).await.unwrap();
    assert_eq!(for_donor.len(), 1);

    let pending = db
        .get_pending_reservations_for_item(&item.id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    let mut approved = reservation.clone();
    approved.status = "approved".to_string();
    db.update_reservation(&approved).await.unwrap();

    let pending_after = db
        .get_pending_reservations_for_item(&item.id)
        .await
        .unwrap();
    assert_eq!(pending_after.len(), 0, "Approved reservation is not pending");

    println!("✓ Reservation queries verified: reservation_id={}", reservation.id);
}

#[tokio::test]
async fn test_item_delete_cascades() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let donor = format!("donor-{}", suffix);
    let requester = format!("requester-{}", suffix);

    let mut item = test_item(&donor);
    db.create_item(&mut item).await.unwrap();
    db.put_like(&Like {
        item_id: item.id.clone(),
        user_id: requester.clone(),
        created_at: now_rfc3339(),
    })
    .await
    .unwrap();

    let mut reservation = pending_reservation(&item, &requester, 1);
    db.create_reservation(&mut reservation).await.unwrap();

    db.delete_item(&item.id).await.unwrap();

    assert!(db.get_item(&item.id).await.unwrap().is_none());
    assert!(db.get_like(&item.id, &requester).await.unwrap().is_none());
    assert!(
        db.get_reservations_for_item(&item.id)
            .await
            .unwrap()
            .is_empty(),
        "Reservations should be cascaded on item delete"
    );

    println!("✓ Item delete cascade verified: item_id={}", item.id);
}

#[tokio::test]
async fn test_bulk_approval_decrements_quantity_and_reuses_chat() {
    require_emulator!();

    let (app, state) = common::create_emulator_app().await;
    let suffix = unique_suffix();
    let donor = format!("donor-{}", suffix);
    let requester = format!("requester-{}", suffix);
    let competitor = format!("competitor-{}", suffix);

    state.db.upsert_user(&test_user(&donor)).await.unwrap();
    state.db.upsert_user(&test_user(&requester)).await.unwrap();
    state.db.upsert_user(&test_user(&competitor)).await.unwrap();

    let mut item = test_item(&donor);
    item.is_bulk_item = true;
    item.quantity = 4;
    state.db.create_item(&mut item).await.unwrap();

    let mut first = pending_reservation(&item, &requester, 2);
    state.db.create_reservation(&mut first).await.unwrap();
    let mut second = pending_reservation(&item, &requester, 2);
    state.db.create_reservation(&mut second).await.unwrap();
    let mut competing = pending_reservation(&item, &competitor, 1);
    state.db.create_reservation(&mut competing).await.unwrap();

    // First approval takes 2 of 4: item stays available, others stay pending
    let response = app
        .clone()
        .oneshot(approve_request(&first.id, &donor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after_first = state.db.get_item(&item.id).await.unwrap().unwrap();
    assert_eq!(after_first.quantity, 2);
    assert_eq!(after_first.status, "available");

    let still_pending = state
        .db
        .get_pending_reservations_for_item(&item.id)
        .await
        .unwrap();
    assert_eq!(
        still_pending.len(),
        2,
        "Remaining stock keeps other requests pending"
    );

    let approved = state.db.get_reservation(&first.id).await.unwrap().unwrap();
    assert_eq!(approved.status, "approved");
    assert!(approved.tracking_id.is_some());

    assert!(
        state
            .db
            .find_chat(&item.id, &requester, &donor)
            .await
            .unwrap()
            .is_some(),
        "Approval should open a chat room"
    );

    // Second approval empties the stock: item donated, competitor declined
    let response = app
        .clone()
        .oneshot(approve_request(&second.id, &donor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after_second = state.db.get_item(&item.id).await.unwrap().unwrap();
    assert_eq!(after_second.quantity, 0);
    assert_eq!(after_second.status, "donated");

    let declined = state
        .db
        .get_reservation(&competing.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(declined.status, "declined");

    // Same (item, requester, donor) triple: the existing chat is reused
    let chats = state.db.get_chats_for_user(&requester).await.unwrap();
    let for_item: Vec<_> = chats.iter().filter(|c| c.item_id == item.id).collect();
    assert_eq!(for_item.len(), 1, "Second approval must not open a second chat");

    println!("✓ Bulk approval flow verified: item_id={}", item.id);
}

#[tokio::test]
async fn test_single_item_approval_reserves_and_declines_competitors() {
    require_emulator!();

    let (app, state) = common::create_emulator_app().await;
    let suffix = unique_suffix();
    let donor = format!("donor-{}", suffix);
    let requester = format!("requester-{}", suffix);
    let competitor = format!("competitor-{}", suffix);

    state.db.upsert_user(&test_user(&donor)).await.unwrap();
    state.db.upsert_user(&test_user(&requester)).await.unwrap();
    state.db.upsert_user(&test_user(&competitor)).await.unwrap();

    let mut item = test_item(&donor);
    state.db.create_item(&mut item).await.unwrap();

    let mut winning = pending_reservation(&item, &requester, 1);
    state.db.create_reservation(&mut winning).await.unwrap();
    let mut losing = pending_reservation(&item, &competitor, 1);
    state.db.create_reservation(&mut losing).await.unwrap();

    let response = app
        .clone()
        .oneshot(approve_request(&winning.id, &donor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = state.db.get_item(&item.id).await.unwrap().unwrap();
    assert_eq!(after.status, "reserved");

    let declined = state.db.get_reservation(&losing.id).await.unwrap().unwrap();
    assert_eq!(declined.status, "declined");

    let approved = state.db.get_reservation(&winning.id).await.unwrap().unwrap();
    assert_eq!(approved.status, "approved");
    assert!(approved.tracking_id.is_some());

    println!("✓ Single-item approval flow verified: item_id={}", item.id);
}

#[tokio::test]
async fn test_chat_dedup_lookup() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let donor = format!("donor-{}", suffix);
    let requester = format!("requester-{}", suffix);
    let item_id = format!("item-{}", suffix);

    let missing = db.find_chat(&item_id, &requester, &donor).await.unwrap();
    assert!(missing.is_none());

    let now = now_rfc3339();
    let mut chat = sharecare_api::models::Chat {
        id: String::new(),
        reservation_id: format!("res-{}", suffix),
        item_id: item_id.clone(),
        donor_id: donor.clone(),
        requester_id: requester.clone(),
        created_at: now.clone(),
        last_message_at: now,
        last_message: None,
        is_active: true,
    };
    db.create_chat(&mut chat).await.unwrap();

    let found = db.find_chat(&item_id, &requester, &donor).await.unwrap();
    assert_eq!(found.map(|c| c.id), Some(chat.id.clone()));

    let for_donor = db.get_chats_for_user(&donor).await.unwrap();
    assert_eq!(for_donor.len(), 1);
    let for_requester = db.get_chats_for_user(&requester).await.unwrap();
    assert_eq!(for_requester.len(), 1);

    println!("✓ Chat dedupe lookup verified: chat_id={}", chat.id);
}
