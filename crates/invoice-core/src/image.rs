//! Embedded images carried as `data:` URIs

use crate::ValidationError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// Upload limit applied when none is configured (2 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// An image stored inline as `data:image/<type>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageData(String);

/// Raw bytes recovered from an [`ImageData`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Wrap an existing URI without checking it
    ///
    /// Use [`ImageData::decode`] or validation to find out whether it is usable.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Turn an uploaded file into a data URI
    ///
    /// # Arguments
    /// * `mime` - Declared media type; must be `image/*`
    /// * `bytes` - File contents
    /// * `max_bytes` - Size limit for `bytes`
    pub fn from_upload(mime: &str, bytes: &[u8], max_bytes: usize) -> Result<Self, ValidationError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(ValidationError::UnsupportedMediaType {
                field: "image".to_string(),
                mime,
            });
        }
        if bytes.len() > max_bytes {
            return Err(ValidationError::ImageTooLarge {
                field: "image".to_string(),
                size: bytes.len(),
                limit: max_bytes,
            });
        }
        if bytes.is_empty() {
            return Err(ValidationError::InvalidImage {
                field: "image".to_string(),
                reason: "file is empty".to_string(),
            });
        }

        Ok(Self(format!("data:{mime};base64,{}", BASE64.encode(bytes))))
    }

    /// The URI as stored
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload back into bytes
    pub fn decode(&self) -> Result<DecodedImage, ValidationError> {
        self.decode_field("image")
    }

    /// Decode, naming `field` in any error
    pub(crate) fn decode_field(&self, field: &str) -> Result<DecodedImage, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidImage {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let rest = self
            .0
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("not a data: URI"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing ',' separator"))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(ValidationError::UnsupportedMediaType {
                field: field.to_string(),
                mime,
            });
        }
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(invalid("payload is not base64"));
        }

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(compact.as_bytes())
            .map_err(|e| invalid(&e.to_string()))?;
        if bytes.is_empty() {
            return Err(invalid("payload is empty"));
        }

        Ok(DecodedImage { mime, bytes })
    }
}

fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/")
        .map(|subtype| !subtype.is_empty())
        .unwrap_or(false)
}
