//! Object storage for case attachments.
//!
//! [`BlobStore`] is the seam the submission workflow and the download
//! endpoint depend on. [`S3Storage`] implements it against AWS S3 or MinIO.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use secrecy::ExposeSecret;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};
use crate::models::AttachmentKind;

/// Extensions accepted for attachments, lower case.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Blob storage operations used by the application.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()>;

    /// Fetch an object and its stored content type.
    async fn get(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage client and make sure the bucket exists.
    pub async fn new(config: &StorageSettings) -> AppResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            config.secret_key.expose_secret(),
            None,
            None,
            "mesa-partes",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let storage = Self {
            client: Client::from_conf(s3_config_builder.build()),
            bucket: config.bucket.clone(),
        };

        storage.ensure_bucket_exists().await?;

        info!("S3 storage initialized: bucket={}", config.bucket);

        Ok(storage)
    }

    /// Ensure the bucket exists, creating it if necessary.
    async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let service_error = e.into_service_error();
                if !service_error.is_not_found() {
                    return Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )));
                }

                info!("Creating S3 bucket '{}'", self.bucket);
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| AppError::Storage(format!("Failed to create bucket: {}", e)))?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl BlobStore for S3Storage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    AppError::NotFound(format!("Archivo no encontrado: {}", key))
                } else {
                    AppError::Storage(format!("Failed to get file from S3: {}", service_error))
                }
            })?;

        let content_type = response.content_type().map(String::from);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read S3 response body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok((data, content_type))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file from S3: {}", e)))?;
        Ok(())
    }
}

/// Lower-cased extension of a filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Whether the filename carries an accepted extension.
pub fn is_allowed_extension(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Get the content type for an accepted extension.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Strip directory components and control characters from a client filename.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "archivo".to_string(),
        name => name.to_string(),
    }
}

/// Build the storage key for an attachment.
///
/// Format: `cases/{case_id}/{principal|complementario}/{file_id}_{filename}`
pub fn attachment_key(case_id: Uuid, kind: AttachmentKind, file_id: Uuid, filename: &str) -> String {
    format!(
        "cases/{}/{}/{}_{}",
        case_id,
        kind.key_segment(),
        file_id,
        sanitize_filename(filename)
    )
}
