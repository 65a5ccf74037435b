//! Durable object storage client.
//!
//! Storage is the second idempotency domain, independent of the local ptau
//! cache: a file can be cached locally but absent from storage, or the other
//! way around. The pipeline always checks presence against storage itself
//! before deciding to skip an upload.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::io::ReaderStream;

use crate::error::{CeremonyError, Result};
use crate::paths::StoragePath;

/// Existence-check and upload primitives over the ceremony's storage namespace.
#[async_trait]
pub trait CeremonyStorage: Send + Sync {
    /// Whether an object already exists at exactly `path`.
    async fn exists(&self, path: &StoragePath) -> Result<bool>;

    /// Upload the local file at `local` to `path`, overwriting any
    /// existing object.
    async fn upload(&self, local: &Path, path: &StoragePath) -> Result<()>;
}

/// HTTP object storage: `HEAD` for existence, `PUT` with a streamed body
/// for uploads.
pub struct HttpStorage {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn object_url(&self, path: &StoragePath) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CeremonyStorage for HttpStorage {
    async fn exists(&self, path: &StoragePath) -> Result<bool> {
        let url = self.object_url(path);
        let response =
            self.client
                .head(&url)
                .send()
                .await
                .map_err(|e| CeremonyError::Upload {
                    path: path.as_str().into(),
                    reason: format!("existence check failed: {e}"),
                })?;

        match response.status() {
            s if s.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            s => Err(CeremonyError::Upload {
                path: path.as_str().into(),
                reason: format!("existence check returned HTTP {s}"),
            }),
        }
    }

    async fn upload(&self, local: &Path, path: &StoragePath) -> Result<()> {
        let url = self.object_url(path);
        let size = tokio::fs::metadata(local).await?.len();
        tracing::info!("uploading {} ({size} bytes) to {path}", local.display());

        let file = tokio::fs::File::open(local).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await
            .map_err(|e| CeremonyError::Upload {
                path: path.as_str().into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CeremonyError::Upload {
                path: path.as_str().into(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        Ok(())
    }
}
