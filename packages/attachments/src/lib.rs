// ABOUTME: Attachment storage abstraction
// ABOUTME: Uploader trait plus a local-filesystem implementation serving /uploads paths

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

pub type UploadResult<T> = Result<T, UploadError>;

/// Decoded attachment as handed to a lifecycle engine
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Accepts raw bytes, returns a retrievable URL path.
/// Lifecycle engines call this BEFORE committing any state transition, so a
/// failed upload aborts the operation instead of leaving a dangling reference.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, bytes: &[u8], filename: &str) -> UploadResult<String>;
}

/// Stores uploads under a local directory, served statically at /uploads
pub struct LocalUploader {
    root: PathBuf,
}

impl LocalUploader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Uploader for LocalUploader {
    async fn upload(&self, bytes: &[u8], filename: &str) -> UploadResult<String> {
        let safe = sanitize(filename)?;
        let stored = format!("{}-{}", nanoid::nanoid!(10), safe);

        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(&stored);
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored attachment {} ({} bytes)", path.display(), bytes.len());
        Ok(format!("/uploads/{stored}"))
    }
}

/// Keep only the final path component and replace anything outside a
/// conservative character set
fn sanitize(filename: &str) -> UploadResult<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() {
        return Err(UploadError::InvalidFilename(filename.to_string()));
    }

    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    Ok(safe)
}
