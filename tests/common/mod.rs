// SPDX-License-Identifier: MIT

use sharecare_api::config::Config;
use sharecare_api::db::FirestoreDb;
use sharecare_api::middleware::create_admin_jwt;
use sharecare_api::routes::create_router;
use sharecare_api::services::{EmailService, StorageService};
use sharecare_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app backed by the Firestore emulator, with storage and
/// email mocked out. Callers must gate on [`require_emulator!`].
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState {
        config,
        db: test_db().await,
        storage: StorageService::new_mock(),
        email: EmailService::new_mock(),
    });
    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState {
        config,
        db: test_db_offline(),
        storage: StorageService::new_mock(),
        email: EmailService::new_mock(),
    });
    (create_router(state.clone()), state)
}

/// Mint a valid admin session token for the test config.
#[allow(dead_code)]
pub fn test_admin_token(state: &AppState) -> String {
    create_admin_jwt(&state.config.admin_email, &state.config.jwt_signing_key)
        .expect("failed to create admin token")
}
