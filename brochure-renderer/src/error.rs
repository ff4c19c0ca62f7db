//! Renderer error types.

use thiserror::Error;

use crate::canvas::ObjectHandle;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The host canvas has no object with this handle.
    #[error("Unknown canvas object: {0}")]
    UnknownObject(ObjectHandle),

    /// Export dimensions are unusable.
    #[error("Invalid export size: {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },

    /// Encoding to an output format failed.
    #[error("Export failed: {0}")]
    Export(String),
}
