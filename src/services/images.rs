use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid image reference: '{0}'")]
    InvalidReference(String),
    #[error("Image file missing: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read image '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory holding the outfit images referenced by the catalog
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of an image inside the store; references must be bare file names
    pub fn resolve(&self, image_ref: &str) -> Result<PathBuf, ImageError> {
        let invalid = image_ref.is_empty()
            || image_ref == "."
            || image_ref == ".."
            || image_ref.contains(['/', '\\']);
        if invalid {
            return Err(ImageError::InvalidReference(image_ref.to_string()));
        }
        Ok(self.root.join(image_ref))
    }

    /// Reads an image and returns it as a `data:` URL
    pub async fn embed(&self, image_ref: &str) -> Result<String, ImageError> {
        let path = self.resolve(image_ref)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImageError::NotFound(path));
            }
            Err(source) => return Err(ImageError::Read { path, source }),
        };

        Ok(format!(
            "data:{};base64,{}",
            mime_for(&path),
            STANDARD.encode(bytes)
        ))
    }
}

/// MIME type guessed from the file extension
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
