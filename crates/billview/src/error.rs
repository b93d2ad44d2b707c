//! Error type for the viewer facade.

use billview_core::BindingError;
use billview_parse::BackendError;
use thiserror::Error;

/// Errors surfaced by [`PageRenderer`](crate::PageRenderer) and
/// [`ViewerSession`](crate::ViewerSession). All are recoverable.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The viewer cannot accept this kind of document at all.
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// Fetching or parsing the document failed.
    #[error("failed to load document: {0}")]
    DocumentLoad(String),

    /// The page could not be read from the document.
    #[error("failed to load page {page}: {source}")]
    PageLoad {
        page: usize,
        #[source]
        source: BackendError,
    },

    /// The page could not be rasterized.
    #[error("failed to render page {page}: {message}")]
    PageRender { page: usize, message: String },

    /// The page rendered but its text layer is unusable.
    #[error("failed to extract text from page {page}: {message}")]
    TextExtraction { page: usize, message: String },

    /// A page operation was requested with no PDF loaded.
    #[error("no document loaded")]
    NoDocument,

    /// Zoom or page changes are refused while a drag is in progress.
    #[error("selection in progress")]
    SelectionInProgress,

    #[error(transparent)]
    Binding(#[from] BindingError),
}
