// SPDX-License-Identifier: MIT

//! ShareCare API Server
//!
//! Backend for the ShareCare mobile application (Food & Clothes Connect):
//! user management, donation items, reservations, chat and item tracking.

use sharecare_api::{
    config::Config,
    db::FirestoreDb,
    services::{EmailService, StorageService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting ShareCare API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize object storage (item and chat images)
    let storage = StorageService::new(&config)
        .await
        .expect("Failed to initialize storage");
    tracing::info!(bucket = %config.storage_bucket, "Storage initialized");

    // Initialize the SMTP email service
    let email = EmailService::new(&config);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        storage,
        email,
    });

    // Build router
    let app = sharecare_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sharecare_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
