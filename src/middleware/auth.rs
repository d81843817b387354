// SPDX-License-Identifier: MIT

//! Authentication middleware for user and admin routes.
//!
//! User routes trust the Firebase uid carried in the Authorization header
//! (with or without a `Bearer ` prefix); the clients obtain it from the
//! Firebase SDK and signature checks happen client-side. Admin routes use a
//! server-issued HS256 JWT.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Authenticated user extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
}

/// Admin JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    /// Subject ("admin")
    pub sub: String,
    /// Admin email
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Admin identity extracted from a valid session token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

/// Middleware that requires a uid in the Authorization header.
pub async fn require_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let uid = match auth_header {
        Some(h) if h.starts_with("Bearer ") => h[7..].trim().to_string(),
        Some(h) if !h.trim().is_empty() => h.trim().to_string(),
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    if uid.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(AuthUser { uid });

    Ok(next.run(request).await)
}

/// Middleware that requires a valid admin session JWT.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<AdminClaims>(&token, &key, &validation).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if token_data.claims.sub != "admin" {
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(AdminUser {
        email: token_data.claims.email,
    });

    Ok(next.run(request).await)
}

/// Create a JWT for an admin session.
pub fn create_admin_jwt(email: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = AdminClaims {
        sub: "admin".to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + 24 * 60 * 60, // 24 hours
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_jwt_round_trip() {
        let key = b"test_jwt_key_32_bytes_minimum!!!";
        let token = create_admin_jwt("admin@example.com", key).unwrap();

        let decoded = decode::<AdminClaims>(
            &token,
            &DecodingKey::from_secret(key),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, "admin");
        assert_eq!(decoded.claims.email, "admin@example.com");
        assert!(decoded.claims.exp > decoded.claims.iat);
    }

    #[test]
    fn test_admin_jwt_rejects_wrong_key() {
        let token = create_admin_jwt("admin@example.com", b"key-one-key-one-key-one-key-one!")
            .unwrap();
        let result = decode::<AdminClaims>(
            &token,
            &DecodingKey::from_secret(b"key-two-key-two-key-two-key-two!"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }
}
