// SPDX-License-Identifier: MIT

//! ShareCare: Food & Clothes Connect backend
//!
//! This crate provides the backend API for the ShareCare mobile application:
//! user profiles, donation items, reservations, chat, notifications and
//! donation tracking, backed by Firestore and Google Cloud Storage.

pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{EmailService, StorageService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub storage: StorageService,
    pub email: EmailService,
}
