use std::path::PathBuf;

use bytes::Bytes;

use crate::error::Result;
use crate::models::message::Attachment;
use crate::utils::filename::{sanitize, unique_upload_name};

pub const PUBLIC_PREFIX: &str = "/uploads/";

/// A file written to the uploads directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Public path served by the static handler, e.g. `/uploads/<name>`.
    pub url: String,
    /// Client-facing name (sanitized original).
    pub name: String,
    pub mime_type: Option<String>,
}

impl From<StoredFile> for Attachment {
    fn from(file: StoredFile) -> Self {
        Attachment {
            url: file.url,
            name: file.name,
            mime_type: file.mime_type,
        }
    }
}

/// A file part read from a multipart request, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    pub async fn save(&self, original_name: &str, mime_type: Option<String>, data: &[u8]) -> Result<StoredFile> {
        tokio::fs::create_dir_all(&self.root).await?;
        let stored_name = unique_upload_name(original_name);
        tokio::fs::write(self.root.join(&stored_name), data).await?;

        Ok(StoredFile {
            url: format!("{}{}", PUBLIC_PREFIX, stored_name),
            name: sanitize(original_name),
            mime_type,
        })
    }

    pub async fn save_upload(&self, upload: &Upload) -> Result<StoredFile> {
        self.save(&upload.file_name, upload.content_type.clone(), &upload.data)
            .await
    }

    /// Resolves a public upload path back to the file on disk.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let name = url.strip_prefix(PUBLIC_PREFIX).unwrap_or(url);
        self.root.join(sanitize(name))
    }

    pub async fn remove(&self, url: &str) -> Result<()> {
        tokio::fs::remove_file(self.path_for(url)).await?;
        Ok(())
    }

    /// Removal that never fails the caller; problems are only logged.
    pub async fn remove_quietly(&self, url: &str) {
        if let Err(e) = self.remove(url).await {
            tracing::warn!(error = %e, url = %url, "failed to remove stored file");
        }
    }
}
