//! Image upload validation and storage
//!
//! Uploaded files are checked before any task operation runs: the original
//! filename must end in an allowed image extension and the payload must stay
//! under the size ceiling. Files land at a deterministic path derived from
//! the field name and the original filename, so re-uploading the same name
//! overwrites the previous file.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Maximum accepted upload size in bytes
pub const MAX_IMAGE_BYTES: usize = 1_000_000;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please upload an image (jpg, jpeg or png)")]
    UnsupportedFile,

    #[error("Image exceeds the maximum size of {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the error is the client's fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedFile | Self::TooLarge)
    }
}

/// Blob store for uploaded task images, keyed by deterministic path
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate and persist an uploaded image.
    ///
    /// Returns the storage path recorded on the task.
    pub async fn save(
        &self,
        field_name: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        // Only the final path component of the client-supplied name is used
        let file_name = Path::new(original_name)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(UploadError::UnsupportedFile)?;

        if !has_allowed_extension(file_name) {
            return Err(UploadError::UnsupportedFile);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge);
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(format!("{}-{}", field_name, file_name));
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("Stored uploaded image at {:?}", path);
        Ok(path.to_string_lossy().to_string())
    }
}

// Case-sensitive on purpose, matching the upstream filter
fn has_allowed_extension(file_name: &str) -> bool {
    ALLOWED_EXTENSIONS
        .iter()
        .any(|ext| file_name.ends_with(&format!(".{}", ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_stores_at_deterministic_path() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());

        let path = store
            .save("taskImage", "cat.png", b"png bytes")
            .await
            .unwrap();
        assert!(path.ends_with("taskImage-cat.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");

        // Same name overwrites
        let again = store
            .save("taskImage", "cat.png", b"other bytes")
            .await
            .unwrap();
        assert_eq!(again, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"other bytes");
    }

    #[tokio::test]
    async fn test_rejects_disallowed_extension() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());

        let result = store.save("taskImage", "cat.gif", b"gif bytes").await;
        assert!(matches!(result, Err(UploadError::UnsupportedFile)));

        // Extension match is case-sensitive
        let result = store.save("taskImage", "cat.PNG", b"png bytes").await;
        assert!(matches!(result, Err(UploadError::UnsupportedFile)));
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());

        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        let result = store.save("taskImage", "big.jpg", &bytes).await;
        assert!(matches!(result, Err(UploadError::TooLarge)));
    }

    #[tokio::test]
    async fn test_client_path_components_are_stripped() {
        let temp = TempDir::new().unwrap();
        let store = ImageStore::new(temp.path());

        let path = store
            .save("taskImage", "../../etc/cat.jpg", b"jpg bytes")
            .await
            .unwrap();
        assert!(path.ends_with("taskImage-cat.jpg"));
        assert!(Path::new(&path).starts_with(temp.path()));
    }
}
