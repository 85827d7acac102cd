//! Source image supplied by the user.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while accepting an image payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Not an image: media type '{0}'")]
    NotAnImage(String),

    #[error("Image payload is empty")]
    Empty,

    #[error("Failed to extract base64 string from data URL: {0}")]
    InvalidDataUrl(String),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// Image bytes plus their declared media type.
///
/// Construction checks that the media type is `image/*` and the payload is
/// non-empty, so a `SourceImage` is always submittable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl SourceImage {
    /// Create a new source image.
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> ImageResult<Self> {
        let bytes = bytes.into();
        let mime_type = mime_type.into().trim().to_ascii_lowercase();

        if !is_image_mime(&mime_type) {
            return Err(ImageError::NotAnImage(mime_type));
        }
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(Self { bytes, mime_type })
    }

    /// Decode a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(data_url: &str) -> ImageResult<Self> {
        let (header, payload) = data_url
            .split_once(',')
            .ok_or_else(|| ImageError::InvalidDataUrl("missing ',' separator".to_string()))?;

        if payload.is_empty() {
            return Err(ImageError::InvalidDataUrl("no payload after ','".to_string()));
        }

        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.strip_suffix(";base64"))
            .ok_or_else(|| ImageError::InvalidDataUrl(format!("unsupported header '{}'", header)))?;

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| ImageError::InvalidDataUrl(e.to_string()))?;

        Self::new(bytes, mime_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 encoding of the payload, as sent on the wire.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

// Raw bytes are noisy in logs.
impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}
