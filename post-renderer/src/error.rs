//! Renderer error types.

use post_core::PostError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while exporting a post.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Building the export-safe clone failed.
    #[error("Sanitization failed: {0}")]
    Sanitize(#[from] PostError),

    /// Export configuration is unusable.
    #[error("Invalid export configuration: {0}")]
    Config(String),

    /// Image data could not be loaded or decoded.
    #[error("Failed to load image: {0}")]
    Image(String),

    /// The laid-out document cannot be turned into a bitmap.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// PNG encoding failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// The finished image could not be handed to the user.
    #[error("Download failed: {0}")]
    Download(#[from] std::io::Error),
}
