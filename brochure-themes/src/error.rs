//! Error types for theme lookup.

use thiserror::Error;

/// Result type for registry operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors from the theme registry.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// No theme with this id is registered.
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// A theme with this id is already registered.
    #[error("Theme already registered: {0}")]
    DuplicateTheme(String),
}
