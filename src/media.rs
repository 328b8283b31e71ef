use image::ImageFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::event::IncomingFile;
use crate::model::PendingImage;

/// MIME types accepted at intake. Must stay in sync with the server's
/// whitelist, or a file the client accepts will bounce after upload.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::WebP,
];

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaError {
    #[error("declared type '{mime}' is not an accepted image type")]
    UnsupportedType { mime: String },

    #[error("file is {size} bytes, maximum is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("file is empty")]
    Empty,

    #[error("content does not match any accepted image format")]
    UnrecognizedContent,
}

/// Validate a shell-provided file before any flow state changes.
///
/// The declared MIME type is checked against the whitelist first (the fast,
/// user-explainable rejection), then the size cap, then the magic bytes. The
/// sniff exists because the declared type is whatever the browser or OS
/// claims; the server decodes the actual bytes, so the client must judge the
/// same evidence. Only the magic bytes are inspected, the image is never
/// decoded here.
pub fn validate_upload(file: IncomingFile, max_bytes: usize) -> Result<PendingImage, MediaError> {
    let declared = file.mime.to_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&declared.as_str()) {
        debug!(mime = %file.mime, name = %file.name, "rejected upload: declared type");
        return Err(MediaError::UnsupportedType { mime: file.mime });
    }

    if file.bytes.len() > max_bytes {
        debug!(size = file.bytes.len(), max = max_bytes, "rejected upload: too large");
        return Err(MediaError::TooLarge {
            size: file.bytes.len(),
            max: max_bytes,
        });
    }

    if file.bytes.is_empty() {
        return Err(MediaError::Empty);
    }

    let format = image::guess_format(&file.bytes).map_err(|_| MediaError::UnrecognizedContent)?;
    if !ALLOWED_FORMATS.contains(&format) {
        debug!(?format, name = %file.name, "rejected upload: sniffed format");
        return Err(MediaError::UnrecognizedContent);
    }

    Ok(PendingImage::new(
        file.name,
        canonical_mime(format).to_string(),
        file.bytes,
    ))
}

/// The MIME type actually sent with the multipart part, derived from the
/// sniffed format rather than the shell's claim.
#[must_use]
pub const fn canonical_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::WebP => "image/webp",
        _ => "application/octet-stream",
    }
}
