//! HTTP middleware.

pub mod auth;
pub mod security;

pub use auth::{create_admin_jwt, require_admin, require_auth, AdminUser, AuthUser};
pub use security::add_security_headers;
