//! Attachment store client for inventory images
//!
//! The ledger never looks at image bytes. It hands them to an
//! [`AttachmentStore`], keeps the returned metadata, and deletes the files
//! again if the database write they belong to fails.

use std::future::Future;
use std::path::PathBuf;

use axum::body::Bytes;
use shared::{image_extension, StoredFile};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// A file received from the client, not yet stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Blob storage for uploaded images
#[axum::async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persist the bytes and describe where they went
    async fn save(&self, file: &UploadedFile) -> AppResult<StoredFile>;

    /// Remove a previously stored file
    async fn delete(&self, stored_name: &str) -> AppResult<()>;

    /// Whether new files can currently be stored
    async fn is_available(&self) -> bool;
}

/// Stores attachments as files in a local directory served under a public path
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
    root: PathBuf,
    public_path: String,
}

impl LocalAttachmentStore {
    /// Create the store, making sure the directory exists
    pub async fn new(root: impl Into<PathBuf>, public_path: &str) -> AppResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::StorageError(format!("cannot create {}: {}", root.display(), e))
        })?;

        Ok(Self {
            root,
            public_path: public_path.trim_end_matches('/').to_string(),
        })
    }

    fn path_for(&self, stored_name: &str) -> AppResult<PathBuf> {
        // Names are generated here, never taken from the client
        if stored_name.is_empty() || stored_name.contains(['/', '\\']) || stored_name.starts_with('.') {
            return Err(AppError::StorageError(format!(
                "invalid stored name '{}'",
                stored_name
            )));
        }
        Ok(self.root.join(stored_name))
    }
}

#[axum::async_trait]
impl AttachmentStore for LocalAttachmentStore {
    async fn save(&self, file: &UploadedFile) -> AppResult<StoredFile> {
        let extension = image_extension(&file.mime_type).unwrap_or("bin");
        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.path_for(&stored_name)?;

        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("cannot write {}: {}", stored_name, e)))?;

        tracing::debug!(
            "Stored attachment {} ({} bytes) as {}",
            file.original_name,
            file.bytes.len(),
            stored_name
        );

        Ok(StoredFile {
            url: format!("{}/{}", self.public_path, stored_name),
            stored_name,
            original_name: file.original_name.clone(),
            size_bytes: file.bytes.len() as i64,
            mime_type: file.mime_type.clone(),
        })
    }

    async fn delete(&self, stored_name: &str) -> AppResult<()> {
        let path = self.path_for(stored_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(format!(
                "cannot delete {}: {}",
                stored_name, e
            ))),
        }
    }
    async fn is_available(&self) -> bool {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            Err(_) => false,
        }
    }
}

/// Best-effort removal of stored files. Failures are logged, not returned:
/// the caller is already on an error path.
pub async fn discard(store: &dyn AttachmentStore, files: &[StoredFile]) {
    for file in files {
        if let Err(e) = store.delete(&file.stored_name).await {
            tracing::warn!("Failed to remove orphaned attachment {}: {}", file.stored_name, e);
        }
    }
}

/// Store every upload. If one fails, the ones already stored are removed.
pub async fn save_all(store: &dyn AttachmentStore, uploads: &[UploadedFile]) -> AppResult<Vec<StoredFile>> {
    let mut stored = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match store.save(upload).await {
            Ok(file) => stored.push(file),
            Err(e) => {
                discard(store, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

/// Store the uploads, then run `persist` with their metadata. If `persist`
/// fails, the stored files are deleted before the error is returned, so a
/// failed create never leaves bytes behind.
pub async fn with_attachments<T, F, Fut>(
    store: &dyn AttachmentStore,
    uploads: &[UploadedFile],
    persist: F,
) -> AppResult<T>
where
    F: FnOnce(Vec<StoredFile>) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let stored = save_all(store, uploads).await?;

    match persist(stored.clone()).await {
        Ok(value) => Ok(value),
        Err(e) => {
            if !stored.is_empty() {
                tracing::info!("Removing {} attachment(s) after failed write", stored.len());
            }
            discard(store, &stored).await;
            Err(e)
        }
    }
}
