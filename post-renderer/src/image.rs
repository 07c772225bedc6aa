//! Image source utilities.
//!
//! Post images travel as `data:` URIs, the same form a browser file reader
//! produces. This module builds those URIs from files and probes their pixel
//! dimensions for layout.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            "gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // GIF: "GIF8"
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type for data URIs.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Encode raw image bytes as a base64 `data:` URI.
#[must_use]
pub fn bytes_to_data_uri(bytes: &[u8], format: ImageFormat) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{encoded}", format.mime())
}

/// Read an image file into a `data:` URI.
///
/// The format is taken from the file contents, falling back to the
/// extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a recognized image.
pub fn file_to_data_uri(path: &Path) -> RenderResult<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Image(format!("{}: {e}", path.display())))?;

    let mut format = ImageFormat::from_magic_bytes(&bytes);
    if format == ImageFormat::Unknown {
        format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(ImageFormat::Unknown, ImageFormat::from_extension);
    }
    if format == ImageFormat::Unknown {
        return Err(RenderError::Image(format!(
            "{}: unrecognized image format",
            path.display()
        )));
    }

    Ok(bytes_to_data_uri(&bytes, format))
}

/// Decode the payload of a `data:` URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Image("Not a data URI".to_string()))?;

    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Image("Invalid data URI: missing comma".to_string()))?;

    if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data.trim())
            .map_err(|e| RenderError::Image(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded_data)
    }
}

/// Simple URL decoding (percent-encoding).
fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Image("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Pixel dimensions of an embedded image, without decoding the pixels.
///
/// Returns `None` for remote sources and undecodable data.
#[must_use]
pub fn probe_dimensions(src: &str) -> Option<(u32, u32)> {
    if !src.starts_with("data:") {
        return None;
    }
    let bytes = decode_data_uri(src).ok()?;
    let dimensions = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    (dimensions.0 > 0 && dimensions.1 > 0).then_some(dimensions)
}
