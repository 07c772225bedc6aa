//! Error types for post model operations.

use thiserror::Error;

/// Result type for post model operations.
pub type PostResult<T> = Result<T, PostError>;

/// Errors that can occur while building or sanitizing post content.
#[derive(Debug, Error)]
pub enum PostError {
    /// A view node cannot be turned into export content.
    #[error("Invalid view node: {0}")]
    InvalidNode(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The draft cannot be saved as a post.
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
