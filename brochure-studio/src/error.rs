//! Error types for store and configuration operations.

use brochure_core::{CoreError, ElementId, PageId};
use brochure_renderer::RenderError;
use brochure_themes::LayoutError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while managing a brochure document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested page does not exist in the document.
    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    /// The requested element does not exist on the page.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// The operation needs a current page and the document has none.
    #[error("No page is selected")]
    NoCurrentPage,

    /// The operation needs an open editor session.
    #[error("No editor session is open")]
    NoSession,

    /// An editor session is already open.
    #[error("An editor session is already open")]
    SessionAlreadyOpen,

    /// A document operation failed.
    #[error("Document error: {0}")]
    Document(#[from] CoreError),

    /// Page generation failed.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Page export failed.
    #[error("Export error: {0}")]
    Export(#[from] RenderError),

    /// A configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
