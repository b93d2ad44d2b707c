//! PDF parsing backend trait.
//!
//! Abstracts opening a document, reading page geometry and interpreting a
//! page into [`PageContent`], so the viewer does not depend on a particular
//! PDF library.

use billview_core::PageContent;

use crate::error::BackendError;
use crate::interpreter::InterpretOptions;

/// A page's MediaBox in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl MediaBox {
    /// Normalize corners so that `x0 <= x1` and `y0 <= y1`.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Operations the viewer needs from a PDF library.
///
/// ```ignore
/// let doc = LopdfBackend::open(&bytes)?;
/// let count = LopdfBackend::page_count(&doc);
/// let page = LopdfBackend::extract_page(&doc, 0, &InterpretOptions::default())?;
/// ```
pub trait PdfBackend {
    /// The parsed document.
    type Document;

    /// Parse PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable, unencrypted PDF.
    fn open(bytes: &[u8]) -> Result<Self::Document, BackendError>;

    fn page_count(doc: &Self::Document) -> usize;

    /// MediaBox of the page at 0-based `index`, inherited through the page
    /// tree when the page has none of its own.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::PageOutOfRange`] for a bad index, or a parse
    /// error when no valid MediaBox exists.
    fn page_media_box(doc: &Self::Document, index: usize) -> Result<MediaBox, BackendError>;

    /// Interpret the page at 0-based `index`. Content is positioned relative
    /// to the MediaBox origin.
    ///
    /// # Errors
    ///
    /// Returns an error when the page's content cannot be decoded or
    /// interpreted.
    fn extract_page(
        doc: &Self::Document,
        index: usize,
        options: &InterpretOptions,
    ) -> Result<PageContent, BackendError>;
}
