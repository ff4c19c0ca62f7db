//! Error types for document operations.

use thiserror::Error;

use crate::element::ElementId;
use crate::page::PageId;

/// Result type for document operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while editing pages and documents.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Element not found on the page.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// Page not found in the document.
    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    /// Geometry contained non-finite values.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Operation not allowed in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
