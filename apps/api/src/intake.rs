//! Image Intake — accepts an uploaded workspace photo and decodes it as the
//! container its filename claims (PNG or JPEG).
//!
//! Acceptance is by filename suffix; the payload is then fully decoded with
//! the `image` crate, so truncated or corrupt bodies are rejected here rather
//! than by the inference backend.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Maps a filename suffix to a format. Only `.png`, `.jpg` and `.jpeg`
    /// are accepted.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".png") {
            Some(Self::Png)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn codec(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }

    fn suffixes(&self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpeg => ".jpg/.jpeg",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageIntakeError {
    #[error("Unsupported image type for '{0}' (expected .jpg, .jpeg or .png)")]
    UnsupportedType(String),

    #[error("Uploaded image is empty")]
    Empty,

    #[error("Image could not be decoded as {format:?}: {reason}")]
    Decode { format: ImageFormat, reason: String },
}

/// A decoded upload, held in memory for the duration of one request.
/// The encoded bytes are kept for the outbound request.
#[derive(Debug, Clone)]
pub struct WorkspaceImage {
    pub file_name: String,
    pub format: ImageFormat,
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Preview metadata returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub file_name: String,
    pub format: ImageFormat,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

impl WorkspaceImage {
    /// Validates and decodes an uploaded file.
    pub fn from_upload(file_name: &str, bytes: Bytes) -> Result<Self, ImageIntakeError> {
        let format = ImageFormat::from_file_name(file_name)
            .ok_or_else(|| ImageIntakeError::UnsupportedType(file_name.to_string()))?;

        if bytes.is_empty() {
            return Err(ImageIntakeError::Empty);
        }

        if let Some(actual) = sniff_other_format(&bytes, format) {
            return Err(ImageIntakeError::Decode {
                format,
                reason: format!(
                    "file is {} but has a {} extension",
                    actual.mime_type(),
                    format.suffixes()
                ),
            });
        }

        let decoded = image::load_from_memory_with_format(&bytes, format.codec())
            .map_err(|e| ImageIntakeError::Decode {
                format,
                reason: e.to_string(),
            })?;

        Ok(Self {
            file_name: file_name.to_string(),
            format,
            width: decoded.width(),
            height: decoded.height(),
            bytes,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            file_name: self.file_name.clone(),
            format: self.format,
            mime_type: self.mime_type(),
            width: self.width,
            height: self.height,
            size_bytes: self.bytes.len(),
        }
    }
}

/// Returns the other supported format when the magic bytes say the payload
/// is that one instead of `claimed`.
fn sniff_other_format(data: &[u8], claimed: ImageFormat) -> Option<ImageFormat> {
    let actual = match image::guess_format(data).ok()? {
        image::ImageFormat::Png => ImageFormat::Png,
        image::ImageFormat::Jpeg => ImageFormat::Jpeg,
        _ => return None,
    };
    (actual != claimed).then_some(actual)
}
