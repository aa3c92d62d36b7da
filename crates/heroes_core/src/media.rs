//! Image payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A base64-encoded image with its MIME type.
///
/// This is the transport encoding the generation backend accepts and
/// returns, and the form in which images are persisted.
///
/// # Examples
///
/// ```
/// use heroes_core::ImageData;
///
/// let image = ImageData::from_bytes("image/png", &[0x89, 0x50, 0x4E, 0x47]);
/// assert_eq!(image.mime_type(), "image/png");
/// assert_eq!(image.to_bytes().unwrap(), vec![0x89, 0x50, 0x4E, 0x47]);
/// assert!(image.to_data_url().starts_with("data:image/png;base64,"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct ImageData {
    /// MIME type, e.g. "image/png"
    mime_type: String,
    /// Base64 (standard alphabet) image bytes
    data: String,
}

impl ImageData {
    /// Wrap already-encoded base64 data.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode the image bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }

    /// Render as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
