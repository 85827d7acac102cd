//! Reading user-selected images from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use vgen_models::{ImageError, SourceImage};

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unrecognized image type for {0}")]
    UnknownType(PathBuf),

    #[error(transparent)]
    Invalid(#[from] ImageError),
}

/// Guess the image media type from a file extension.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime)
}

/// Read an image file without blocking the runtime.
pub async fn load_image(path: impl AsRef<Path>) -> Result<SourceImage, ImageLoadError> {
    let path = path.as_ref();
    let mime_type =
        mime_type_for(path).ok_or_else(|| ImageLoadError::UnknownType(path.to_path_buf()))?;

    let bytes = tokio::fs::read(path).await.map_err(|source| ImageLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), mime_type, "Loaded image");
    Ok(SourceImage::new(bytes, mime_type)?)
}

/// Load an image from either a `data:` URL or a file path.
///
/// Hosts whose file picker hands over data URLs and hosts that pass paths
/// both go through here.
pub async fn load_image_source(source: &str) -> Result<SourceImage, ImageLoadError> {
    if source.starts_with("data:") {
        let image = SourceImage::from_data_url(source)?;
        debug!(bytes = image.len(), mime_type = image.mime_type(), "Decoded data URL image");
        return Ok(image);
    }
    load_image(source).await
}
