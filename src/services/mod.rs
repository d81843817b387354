//! External service clients and domain helpers.

pub mod email;
pub mod notify;
pub mod storage;
pub mod tracking;

pub use email::EmailService;
pub use storage::StorageService;
