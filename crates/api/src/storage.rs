//! Local-directory storage for item photos.
//!
//! Files are written under [`ImageStore::root`] with a random UUID name and
//! addressed by a public path of the form `/uploads/<file>`, which the router
//! serves statically.

use std::path::{Path, PathBuf};

/// URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Image file extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unsupported image type '{0}'. Allowed: jpg, jpeg, png, gif, webp")]
    UnsupportedType(String),

    #[error("Image exceeds the maximum upload size of {max} bytes")]
    TooLarge { max: usize },

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes and removes uploaded images in a single local directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate and persist one image, returning its public path.
    ///
    /// The extension is taken from `original_filename` and checked against
    /// [`ALLOWED_EXTENSIONS`]; the stored name never reuses client input.
    pub async fn store(
        &self,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let ext = extension_of(original_filename)?;
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                max: self.max_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = format!("{}.{ext}", uuid::Uuid::new_v4());
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Stored image");
        Ok(format!("{PUBLIC_PREFIX}{file_name}"))
    }

    /// Remove a previously stored image. Best effort: failures are logged.
    pub async fn delete(&self, public_path: &str) {
        let Some(file_name) = self.local_name(public_path) else {
            tracing::warn!(path = %public_path, "Refusing to delete path outside image store");
            return;
        };

        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => tracing::debug!(path = %public_path, "Deleted image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %public_path, error = %e, "Failed to delete image"),
        }
    }

    /// Remove every path in `paths`.
    pub async fn delete_all(&self, paths: &[String]) {
        for path in paths {
            self.delete(path).await;
        }
    }

    fn local_name<'a>(&self, public_path: &'a str) -> Option<&'a str> {
        let name = public_path.strip_prefix(PUBLIC_PREFIX)?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(name)
    }
}

fn extension_of(filename: &str) -> Result<String, StorageError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedType(ext))
    }
}
