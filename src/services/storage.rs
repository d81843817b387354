// SPDX-License-Identifier: MIT

//! Object storage client for uploaded images.
//!
//! Talks to the bucket over the S3-compatible interoperability API, so the
//! same code works against Google Cloud Storage in production and MinIO in
//! local development. Uploaded files land under `images/{uuid}.{ext}` and are
//! served through the bucket's public endpoint.

use crate::config::Config;
use crate::error::AppError;
use s3::creds::Credentials;
use s3::{Bucket, Region};

/// MIME types accepted by the upload endpoints.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Storage client. `bucket` is `None` in offline test mode.
#[derive(Clone)]
pub struct StorageService {
    bucket: Option<Box<Bucket>>,
    endpoint: String,
    bucket_name: String,
}

impl StorageService {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.storage_access_key),
            Some(&config.storage_secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.storage_region.clone(),
            endpoint: config.storage_endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.storage_bucket, region, credentials)
            .map_err(|e| AppError::Storage(format!("Failed to open storage bucket: {}", e)))?;

        // GCS interop and MinIO both want path-style URLs
        bucket.set_path_style();

        tracing::info!(
            bucket = %config.storage_bucket,
            endpoint = %config.storage_endpoint,
            "Storage client initialized"
        );

        Ok(Self {
            bucket: Some(bucket),
            endpoint: config.storage_endpoint.clone(),
            bucket_name: config.storage_bucket.clone(),
        })
    }

    /// Create a mock storage client for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            bucket: None,
            endpoint: "https://storage.googleapis.com".to_string(),
            bucket_name: "test-bucket".to_string(),
        }
    }

    /// Whether a real storage bucket is attached.
    pub fn is_connected(&self) -> bool {
        self.bucket.is_some()
    }

    fn get_bucket(&self) -> Result<&Bucket, AppError> {
        self.bucket
            .as_deref()
            .ok_or_else(|| AppError::Storage("Storage not connected (offline mode)".to_string()))
    }

    /// Upload an image and return its public URL.
    ///
    /// The stored key is `images/{uuid}.{ext}` where the extension comes from
    /// the client's filename (defaulting to jpg).
    pub async fn upload_image(
        &self,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, AppError> {
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(AppError::BadRequest(
                "Invalid file type. Only images are allowed.".to_string(),
            ));
        }

        let extension = filename.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("jpg");
        let key = format!("images/{}.{}", uuid::Uuid::new_v4(), extension);

        self.get_bucket()?
            .put_object_with_content_type(&key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        tracing::debug!(key = %key, size = data.len(), "Uploaded image");

        Ok(self.public_url(&key))
    }

    /// Public URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket_name, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_format() {
        let storage = StorageService::new_mock();
        assert_eq!(
            storage.public_url("images/abc.png"),
            "https://storage.googleapis.com/test-bucket/images/abc.png"
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_types() {
        let storage = StorageService::new_mock();
        let err = storage
            .upload_image("notes.txt", "text/plain", b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_mock_upload_reports_offline() {
        let storage = StorageService::new_mock();
        let err = storage
            .upload_image("photo.png", "image/png", b"pngdata")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
