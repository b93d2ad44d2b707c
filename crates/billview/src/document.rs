//! Loaded documents.

use billview_core::{DocumentKind, PageContent, UnsupportedReason};
use billview_parse::{BackendError, InterpretOptions, LopdfBackend, LopdfDocument, PdfBackend};

/// A PDF opened for viewing.
///
/// ```ignore
/// let pdf = Pdf::open(&bytes, None)?;
/// let page = pdf.page(0)?;
/// ```
#[derive(Debug)]
pub struct Pdf {
    doc: LopdfDocument,
    options: InterpretOptions,
}

impl Pdf {
    /// Parse PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the bytes are not a readable, unencrypted
    /// PDF.
    pub fn open(bytes: &[u8], options: Option<InterpretOptions>) -> Result<Self, BackendError> {
        let doc = LopdfBackend::open(bytes)?;
        Ok(Self {
            doc,
            options: options.unwrap_or_default(),
        })
    }

    pub fn page_count(&self) -> usize {
        LopdfBackend::page_count(&self.doc)
    }

    /// Interpret the page at 0-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the index is out of range or the page
    /// content cannot be interpreted.
    pub fn page(&self, index: usize) -> Result<PageContent, BackendError> {
        LopdfBackend::extract_page(&self.doc, index, &self.options)
    }
}

/// A document after loading and classification.
#[derive(Debug)]
pub enum DocumentHandle {
    Pdf(Pdf),
    /// Shown as-is by the embedding view.
    Image { mime_type: String, bytes: Vec<u8> },
    /// Decoded text, pretty-printed when it is JSON.
    Text { content: String },
    Unsupported(UnsupportedReason),
}

impl DocumentHandle {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Pdf(_) => DocumentKind::Pdf,
            Self::Image { .. } => DocumentKind::Image,
            Self::Text { .. } => DocumentKind::Text,
            Self::Unsupported(reason) => DocumentKind::Unsupported(*reason),
        }
    }

    pub fn as_pdf(&self) -> Option<&Pdf> {
        match self {
            Self::Pdf(pdf) => Some(pdf),
            _ => None,
        }
    }

    /// Number of pages; non-PDF documents count as one page.
    pub fn page_count(&self) -> usize {
        self.as_pdf().map_or(1, Pdf::page_count)
    }
}

/// Decode text-like document bytes. JSON is re-indented with its key order
/// kept; text that does not parse as JSON is returned verbatim.
pub fn decode_text(bytes: &[u8], json: bool) -> String {
    let text = String::from_utf8_lossy(bytes).into_owned();
    if !json {
        return text;
    }
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(text),
        Err(_) => text,
    }
}
