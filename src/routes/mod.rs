// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod chats;
pub mod items;
pub mod notifications;
pub mod reservations;
pub mod tracking;
pub mod uploads;
pub mod users;

use crate::docs::ApiDoc;
use crate::middleware::{require_admin, require_auth};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

const SERVICE_NAME: &str = "ShareCare: Food & Clothes Connect API";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Root greeting, used by uptime probes.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to ShareCare: Food & Clothes Connect API",
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
    }))
}

/// Health check with backing service status.
async fn health_check(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    let firestore_status = if state.db.is_connected() {
        "connected"
    } else {
        "offline"
    };
    let storage_status = if state.storage.is_connected() {
        "connected"
    } else {
        "offline"
    };
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "description": "Backend API for the ShareCare donation platform",
        "firestore_status": firestore_status,
        "storage_status": storage_status,
    }))
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/api/v1/health", get(health_check))
        .merge(auth::routes());

    // User routes (bearer uid required)
    let user_routes = Router::new()
        .merge(users::routes())
        .merge(uploads::routes())
        .merge(items::routes())
        .merge(reservations::routes())
        .merge(tracking::routes())
        .merge(chats::routes())
        .merge(notifications::routes())
        .route_layer(middleware::from_fn(require_auth));

    // Admin routes (JWT required)
    let admin_routes = Router::new().nest(
        "/api/v1/admin",
        admin::routes().route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
    );

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
