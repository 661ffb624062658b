//! Image upload validation.
//!
//! The media type of an upload is decided from its leading bytes only; the
//! client-supplied filename and `Content-Type` are never trusted for that.

use std::path::Path;

use chrono::Utc;

use crate::error::DomainError;

/// Uploads larger than this are rejected (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Number of leading bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 512;

const MAX_EXTENSION_LEN: usize = 10;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl MediaType {
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Gif => "image/gif",
            MediaType::WebP => "image/webp",
        }
    }

    /// Lower-case extensions (without the dot) a file of this type may carry.
    pub fn known_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaType::Jpeg => &["jpg", "jpeg"],
            MediaType::Png => &["png"],
            MediaType::Gif => &["gif"],
            MediaType::WebP => &["webp"],
        }
    }

    /// Extension (with leading dot) used when the upload's own one is absent or
    /// does not belong to the detected type.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Jpeg => ".jpg",
            MediaType::Png => ".png",
            MediaType::Gif => ".gif",
            MediaType::WebP => ".webp",
        }
    }
}

/// Detect the image type from content. Only the first [`SNIFF_LEN`] bytes are
/// looked at; returns `None` for anything that is not an accepted image.
pub fn sniff(bytes: &[u8]) -> Option<MediaType> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];

    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(MediaType::Jpeg)
    } else if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(MediaType::Png)
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Some(MediaType::Gif)
    } else if head.len() >= 14
        && &head[..4] == b"RIFF"
        && &head[8..12] == b"WEBP"
        && &head[12..14] == b"VP"
    {
        Some(MediaType::WebP)
    } else {
        None
    }
}

/// An upload that passed validation, with the name it will be stored under.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub media_type: MediaType,
    pub filename: String,
}

impl UploadedImage {
    /// Check size and content of an upload and pick a collision-resistant name.
    pub fn inspect(original_name: Option<&str>, bytes: &[u8]) -> Result<Self, DomainError> {
        Self::check_size(bytes.len())?;

        let media_type = sniff(bytes).ok_or_else(|| {
            DomainError::validation("Unsupported file type, only JPEG, PNG, GIF and WebP are allowed")
        })?;

        let extension = original_name
            .and_then(extension_of)
            .filter(|ext| media_type.known_extensions().contains(&ext.as_str()))
            .map(|ext| format!(".{ext}"))
            .unwrap_or_else(|| media_type.extension().to_string());

        Ok(Self {
            media_type,
            filename: unique_filename(&extension),
        })
    }

    /// Size check on its own, for callers that read an upload in chunks.
    pub fn check_size(len: usize) -> Result<(), DomainError> {
        if len > MAX_UPLOAD_BYTES {
            return Err(DomainError::validation("File size must not exceed 10MB"));
        }
        Ok(())
    }
}

fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `<unix seconds>_<8 hex chars><ext>`
fn unique_filename(extension: &str) -> String {
    let suffix: [u8; 4] = rand::random();
    format!("{}_{}{}", Utc::now().timestamp(), hex::encode(suffix), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn png(len: usize) -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(len, 0);
        bytes
    }

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]), Some(MediaType::Jpeg));
        assert_eq!(sniff(&png(64)), Some(MediaType::Png));
        assert_eq!(sniff(b"GIF89a......"), Some(MediaType::Gif));
        assert_eq!(sniff(b"GIF87a......"), Some(MediaType::Gif));
        assert_eq!(sniff(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some(MediaType::WebP));
    }

    #[test]
    fn test_sniff_rejects_other_content() {
        assert_eq!(sniff(b""), None);
        assert_eq!(sniff(b"hello, this is plain text"), None);
        assert_eq!(sniff(b"%PDF-1.7"), None);
        assert_eq!(sniff(b"RIFF\x10\x00\x00\x00WAVEfmt "), None);
    }

    #[test]
    fn test_sniff_only_reads_prefix() {
        let mut bytes = vec![b'a'; SNIFF_LEN];
        bytes.extend_from_slice(PNG_MAGIC);
        assert_eq!(sniff(&bytes), None);
    }

    #[test]
    fn test_renamed_text_file_is_rejected() {
        let err = UploadedImage::inspect(Some("photo.png"), b"not an image at all").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_size_boundary() {
        assert!(UploadedImage::inspect(Some("big.png"), &png(MAX_UPLOAD_BYTES)).is_ok());
        assert!(UploadedImage::inspect(Some("big.png"), &png(MAX_UPLOAD_BYTES + 1)).is_err());
    }

    #[test]
    fn test_extension_from_filename_is_lowercased() {
        let image = UploadedImage::inspect(Some("Holiday.PNG"), &png(32)).unwrap();
        assert!(image.filename.ends_with(".png"));
    }

    #[test]
    fn test_extension_falls_back_to_media_type() {
        let image = UploadedImage::inspect(Some("README"), b"GIF89a....").unwrap();
        assert!(image.filename.ends_with(".gif"));

        let image = UploadedImage::inspect(None, &[0xFF, 0xD8, 0xFF, 0xDB]).unwrap();
        assert!(image.filename.ends_with(".jpg"));
    }

    #[test]
    fn test_extension_must_match_content() {
        let image = UploadedImage::inspect(Some("x.html"), &png(32)).unwrap();
        assert!(image.filename.ends_with(".png"));

        let image = UploadedImage::inspect(Some("photo.gif"), &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        assert!(image.filename.ends_with(".jpg"));

        let image = UploadedImage::inspect(Some("photo.JPEG"), &[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        assert!(image.filename.ends_with(".jpeg"));
    }

    #[test]
    fn test_filename_shape() {
        let image = UploadedImage::inspect(Some("a.png"), &png(32)).unwrap();
        let stem = image.filename.strip_suffix(".png").unwrap();
        let (secs, suffix) = stem.split_once('_').unwrap();

        assert!(secs.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_filenames_differ() {
        let a = UploadedImage::inspect(Some("a.png"), &png(32)).unwrap();
        let b = UploadedImage::inspect(Some("a.png"), &png(32)).unwrap();
        assert_ne!(a.filename, b.filename);
    }
}
