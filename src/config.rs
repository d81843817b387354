//! Application configuration loaded from environment variables.
//!
//! The Google service account is supplied through
//! `GOOGLE_APPLICATION_CREDENTIALS` as a Base64-encoded JSON blob (not the
//! conventional file path). It is decoded once at startup, the project id is
//! extracted, and the decoded key is written to a runtime file so the GCP SDK
//! credential chain can pick it up.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::env;
use std::path::Path;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (extracted from the service-account blob)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS
    pub frontend_url: String,

    // --- Object storage (GCS interoperability / S3 protocol) ---
    pub storage_bucket: String,
    pub storage_endpoint: String,
    pub storage_region: String,
    pub storage_access_key: String,
    pub storage_secret_key: String,

    // --- SMTP email ---
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_address: String,
    pub email_password: String,

    // --- Admin session ---
    pub admin_email: String,
    pub admin_password: String,
    /// JWT signing key for admin session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id = match env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            Ok(raw) => materialize_credentials(&raw)?,
            // Emulator and CI setups have no service account
            Err(_) => env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_APPLICATION_CREDENTIALS"))?,
        };

        Ok(Self {
            gcp_project_id,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "sharecare.appspot.com".to_string()),
            storage_endpoint: env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "https://storage.googleapis.com".to_string()),
            storage_region: env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            storage_access_key: env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            storage_secret_key: env::var("STORAGE_SECRET_KEY").unwrap_or_default(),

            smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            email_address: env::var("EMAIL_ADDRESS").unwrap_or_default(),
            email_password: env::var("EMAIL_PASSWORD").unwrap_or_default(),

            admin_email: env::var("ADMIN_EMAIL").map_err(|_| ConfigError::Missing("ADMIN_EMAIL"))?,
            admin_password: env::var("ADMIN_PASSWORD")
                .map_err(|_| ConfigError::Missing("ADMIN_PASSWORD"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            storage_bucket: "test-bucket".to_string(),
            storage_endpoint: "https://storage.googleapis.com".to_string(),
            storage_region: "auto".to_string(),
            storage_access_key: String::new(),
            storage_secret_key: String::new(),
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            email_address: String::new(),
            email_password: String::new(),
            admin_email: "admin@sharecare.test".to_string(),
            admin_password: "admin-test-password".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }
}

/// Decode the Base64 service-account blob, write it to a runtime key file,
/// and point `GOOGLE_APPLICATION_CREDENTIALS` at that file for the SDK.
///
/// A value that is already a path to an existing file is used as-is, so the
/// conventional file-path form keeps working for local development.
fn materialize_credentials(raw: &str) -> Result<String, ConfigError> {
    let json = if Path::new(raw).exists() {
        std::fs::read_to_string(raw)
            .map_err(|e| ConfigError::Credentials(format!("failed to read key file: {}", e)))?
    } else {
        let decoded = STANDARD
            .decode(raw.trim())
            .map_err(|e| ConfigError::Credentials(format!("invalid Base64 blob: {}", e)))?;
        String::from_utf8(decoded)
            .map_err(|e| ConfigError::Credentials(format!("key blob is not UTF-8: {}", e)))?
    };

    let parsed: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| ConfigError::Credentials(format!("invalid key JSON: {}", e)))?;
    let project_id = parsed
        .get("project_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConfigError::Credentials("key JSON has no project_id".to_string()))?
        .to_string();

    if !Path::new(raw).exists() {
        let key_path = env::temp_dir().join("sharecare-service-account.json");
        std::fs::write(&key_path, &json)
            .map_err(|e| ConfigError::Credentials(format!("failed to write key file: {}", e)))?;
        env::set_var("GOOGLE_APPLICATION_CREDENTIALS", &key_path);
        tracing::info!(path = %key_path.display(), "Service account key materialized");
    }

    Ok(project_id)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Service account credentials error: {0}")]
    Credentials(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_credentials_from_base64() {
        let key = r#"{"type":"service_account","project_id":"sharecare-test"}"#;
        let blob = STANDARD.encode(key);

        let project_id = materialize_credentials(&blob).expect("blob should decode");
        assert_eq!(project_id, "sharecare-test");

        let path = env::var("GOOGLE_APPLICATION_CREDENTIALS").unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, key);
    }

    #[test]
    fn test_materialize_credentials_rejects_garbage() {
        let err = materialize_credentials("@@not-base64@@").unwrap_err();
        assert!(matches!(err, ConfigError::Credentials(_)));
    }

    #[test]
    fn test_materialize_credentials_requires_project_id() {
        let blob = STANDARD.encode(r#"{"type":"service_account"}"#);
        let err = materialize_credentials(&blob).unwrap_err();
        assert!(matches!(err, ConfigError::Credentials(_)));
    }
}
