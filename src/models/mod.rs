// SPDX-License-Identifier: MIT

//! Data models for Firestore documents and API payloads.

pub mod chat;
pub mod item;
pub mod notification;
pub mod report;
pub mod reservation;
pub mod response;
pub mod tracking;
pub mod user;

pub use chat::{Chat, Message};
pub use item::{DonorInfo, Item, Location};
pub use notification::Notification;
pub use report::Report;
pub use reservation::{Favorite, ItemSnapshot, Like, Reservation};
pub use response::{paginate, ApiResponse};
pub use tracking::{StatusEntry, Tracking, TrackingStatus};
pub use user::User;
