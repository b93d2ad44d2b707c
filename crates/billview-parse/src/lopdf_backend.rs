//! lopdf-based PDF parsing backend.
//!
//! Implements [`PdfBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate.

use billview_core::{Ctm, PageContent};

use crate::backend::{MediaBox, PdfBackend};
use crate::error::BackendError;
use crate::interpreter::{InterpretOptions, Interpreter};

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page ObjectIds in page order.
    page_ids: Vec<lopdf::ObjectId>,
}

impl LopdfDocument {
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    fn page_id(&self, index: usize) -> Result<lopdf::ObjectId, BackendError> {
        self.page_ids
            .get(index)
            .copied()
            .ok_or(BackendError::PageOutOfRange {
                index,
                count: self.page_ids.len(),
            })
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// The lopdf-based PDF backend.
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;

    fn open(bytes: &[u8]) -> Result<Self::Document, BackendError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        if inner.is_encrypted() {
            return Err(BackendError::Encrypted);
        }
        // get_pages is keyed by 1-based page number.
        let page_ids = inner.get_pages().values().copied().collect();
        Ok(LopdfDocument { inner, page_ids })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn page_media_box(doc: &Self::Document, index: usize) -> Result<MediaBox, BackendError> {
        let page_id = doc.page_id(index)?;
        let obj = resolve_inherited(&doc.inner, page_id, b"MediaBox")?
            .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?;
        let array = resolve_ref(&doc.inner, obj)
            .as_array()
            .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
        if array.len() != 4 {
            return Err(BackendError::Parse(format!(
                "expected 4-element array for MediaBox, got {}",
                array.len()
            )));
        }
        Ok(MediaBox::new(
            object_to_f64(&array[0])?,
            object_to_f64(&array[1])?,
            object_to_f64(&array[2])?,
            object_to_f64(&array[3])?,
        ))
    }

    fn extract_page(
        doc: &Self::Document,
        index: usize,
        options: &InterpretOptions,
    ) -> Result<PageContent, BackendError> {
        let media_box = Self::page_media_box(doc, index)?;
        let page_id = doc.page_id(index)?;
        let page_dict = doc
            .inner
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        let content = get_page_content_bytes(&doc.inner, page_dict)?;
        let resources = get_page_resources(&doc.inner, page_id)?;

        let mut page = PageContent::new(media_box.width(), media_box.height());
        let origin = Ctm::new(1.0, 0.0, 0.0, 1.0, -media_box.x0, -media_box.y0);
        Interpreter::new(&doc.inner, &mut page, options, origin).run(&content, resources, 0)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = index + 1,
            glyphs = page.glyphs.len(),
            shapes = page.shapes.len(),
            "page interpreted"
        );
        Ok(page)
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Result<f64, BackendError> {
    match obj {
        lopdf::Object::Integer(i) => Ok(*i as f64),
        lopdf::Object::Real(f) => Ok(*f as f64),
        _ => Err(BackendError::Parse(format!("expected number, got {obj:?}"))),
    }
}

/// Follow an indirect reference, returning the object itself when it is
/// direct or the reference is dangling.
pub(crate) fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Decode a stream, decompressing if it declares a filter.
pub(crate) fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Look up a key on the page, walking up the page tree via /Parent.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current_id = page_id;
    loop {
        let dict = doc
            .get_object(current_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                current_id = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

/// Content stream bytes of a page; `/Contents` may be one stream or an
/// array of streams.
fn get_page_content_bytes(
    doc: &lopdf::Document,
    page_dict: &lopdf::Dictionary,
) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };
    match resolve_ref(doc, contents) {
        lopdf::Object::Stream(stream) => decode_stream(stream),
        lopdf::Object::Array(items) => {
            let mut content = Vec::new();
            for item in items {
                let stream = resolve_ref(doc, item).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&decode_stream(stream)?);
            }
            Ok(content)
        }
        _ => Err(BackendError::Parse(
            "/Contents is not a stream or array".to_string(),
        )),
    }
}

/// The resources dictionary of a page, inherited if needed.
fn get_page_resources(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<&lopdf::Dictionary, BackendError> {
    static EMPTY_DICT: std::sync::LazyLock<lopdf::Dictionary> =
        std::sync::LazyLock::new(lopdf::Dictionary::new);
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => resolve_ref(doc, obj)
            .as_dict()
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => Ok(&EMPTY_DICT),
    }
}
