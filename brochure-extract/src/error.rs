//! Error types for DOM extraction.

use thiserror::Error;

/// Result type for extraction.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that stop an extraction.
///
/// Individual nodes that cannot be converted are skipped and logged instead.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The preview scale must be finite and positive.
    #[error("Invalid scale: {0}")]
    InvalidScale(f32),

    /// DOM snapshot JSON could not be parsed.
    #[error("Snapshot parse error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
