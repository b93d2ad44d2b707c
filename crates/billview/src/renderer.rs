//! Document loading, page rendering, pagination and zoom.

use billview_core::{
    DocumentKind, GlyphLayer, HighlightLayer, Pager, UnsupportedReason, Viewport, Zoom, classify,
    is_json,
};
use tracing::{debug, error, warn};

use crate::document::{DocumentHandle, Pdf, decode_text};
use crate::error::ViewerError;
use crate::options::ViewerOptions;
use crate::raster::{Surface, rasterize};
use crate::source::DocumentSource;

/// One rendered page: the raster surface and the text layer over it.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 0-based page index.
    pub index: usize,
    pub surface: Surface,
    pub layer: GlyphLayer,
}

impl RenderedPage {
    pub fn viewport(&self) -> &Viewport {
        self.layer.viewport()
    }

    /// A copy of the surface with `highlights` painted over it.
    pub fn composite(&self, highlights: &HighlightLayer) -> Surface {
        let mut surface = self.surface.clone();
        surface.paint_highlights(highlights);
        surface
    }
}

/// A render request. Only the most recently issued ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTicket {
    pub generation: u64,
    /// 0-based page index.
    pub index: usize,
    pub zoom: f64,
}

/// Render one PDF page in three stages, each with its own failure.
///
/// # Errors
///
/// [`ViewerError::PageLoad`] when the page cannot be read,
/// [`ViewerError::PageRender`] when it cannot be rasterized and
/// [`ViewerError::TextExtraction`] when its text layer has unusable geometry.
pub fn render_pdf_page(
    pdf: &Pdf,
    index: usize,
    zoom: f64,
    options: &ViewerOptions,
) -> Result<RenderedPage, ViewerError> {
    let page_number = index + 1;
    let content = pdf.page(index).map_err(|source| ViewerError::PageLoad {
        page: page_number,
        source,
    })?;

    let viewport = content.viewport(zoom);
    let surface = rasterize(&content, &viewport, &options.raster).map_err(|message| {
        ViewerError::PageRender {
            page: page_number,
            message,
        }
    })?;

    if let Some(bad) = content.glyphs.iter().find(|g| {
        let t = &g.transform;
        ![t.a, t.b, t.c, t.d, t.e, t.f, g.width, g.height]
            .iter()
            .all(|v| v.is_finite())
    }) {
        return Err(ViewerError::TextExtraction {
            page: page_number,
            message: format!("run {:?} has non-finite geometry", bad.text),
        });
    }
    let layer = GlyphLayer::new(viewport, content.glyphs);

    debug!(
        page = page_number,
        zoom,
        glyphs = layer.glyphs().len(),
        width = surface.width(),
        height = surface.height(),
        "page rendered"
    );
    Ok(RenderedPage {
        index,
        surface,
        layer,
    })
}

/// Loads a document and keeps the current page rendered.
///
/// The current [`RenderedPage`] is replaced whole on every successful render
/// and dropped when a render fails, leaving the renderer in an error state
/// until the next navigation or load.
#[derive(Debug)]
pub struct PageRenderer {
    options: ViewerOptions,
    document: Option<DocumentHandle>,
    pager: Pager,
    zoom: Zoom,
    current: Option<RenderedPage>,
    generation: u64,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}

impl PageRenderer {
    pub fn new(options: ViewerOptions) -> Self {
        let zoom = Zoom::new(options.zoom.clone());
        Self {
            options,
            document: None,
            pager: Pager::new(0),
            zoom,
            current: None,
            generation: 0,
        }
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Load the document at `url`, classify it and, for a PDF, render its
    /// first page.
    ///
    /// Documents rejected by the allow-list or with no previewer load as
    /// [`DocumentKind::Unsupported`] rather than failing.
    ///
    /// # Errors
    ///
    /// [`ViewerError::DocumentLoad`] for an empty URL, a failed fetch or an
    /// unreadable PDF; [`ViewerError::UnsupportedDocumentType`] when no
    /// types are allowed at all; any render error for the first page.
    pub async fn load<S: DocumentSource + ?Sized>(
        &mut self,
        source: &S,
        url: &str,
        mime_type: &str,
        extension: Option<&str>,
    ) -> Result<DocumentKind, ViewerError> {
        self.document = None;
        self.current = None;
        self.pager = Pager::new(0);
        // Invalidate renders issued for the previous document.
        self.generation += 1;

        if url.trim().is_empty() {
            return Err(ViewerError::DocumentLoad("No valid file URL provided".into()));
        }
        if self.options.supported_types.is_empty() {
            return Err(ViewerError::UnsupportedDocumentType(
                "no supported types configured".into(),
            ));
        }

        let kind = if self.options.supported_types.allows(mime_type, extension) {
            classify(mime_type, extension)
        } else {
            DocumentKind::Unsupported(UnsupportedReason::NotAllowed)
        };
        debug!(url, mime_type, extension, ?kind, "document classified");

        let handle = match kind {
            DocumentKind::Unsupported(reason) => {
                warn!(url, mime_type, ?reason, "document cannot be previewed");
                DocumentHandle::Unsupported(reason)
            }
            DocumentKind::Pdf => {
                let bytes = source.fetch(url).await?;
                let pdf = Pdf::open(&bytes, Some(self.options.interpret_options()))
                    .map_err(|e| ViewerError::DocumentLoad(e.to_string()))?;
                DocumentHandle::Pdf(pdf)
            }
            DocumentKind::Image => DocumentHandle::Image {
                mime_type: mime_type.trim().to_ascii_lowercase(),
                bytes: source.fetch(url).await?,
            },
            DocumentKind::Text => {
                let bytes = source.fetch(url).await?;
                DocumentHandle::Text {
                    content: decode_text(&bytes, is_json(mime_type, extension)),
                }
            }
        };

        self.pager = Pager::new(handle.page_count());
        self.zoom = Zoom::new(self.options.zoom.clone());
        if let Some(width) = self.options.container_width {
            self.zoom.fit_width(width);
        }
        let is_pdf = handle.as_pdf().is_some();
        self.document = Some(handle);
        if is_pdf {
            self.render_current()?;
        }
        Ok(kind)
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        self.document.as_ref().map(DocumentHandle::kind)
    }

    /// 1-based number of the current page.
    pub fn page_number(&self) -> usize {
        self.pager.current()
    }

    pub fn page_count(&self) -> usize {
        self.pager.count()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.factor()
    }

    pub fn current(&self) -> Option<&RenderedPage> {
        self.current.as_ref()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.current.as_ref().map(|p| &p.surface)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.current.as_ref().map(RenderedPage::viewport)
    }

    pub fn glyph_layer(&self) -> Option<&GlyphLayer> {
        self.current.as_ref().map(|p| &p.layer)
    }

    /// Generation of the newest render request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Issue a render request for the current page and zoom, superseding any
    /// outstanding request.
    pub fn begin_render(&mut self) -> RenderTicket {
        self.generation += 1;
        RenderTicket {
            generation: self.generation,
            index: self.pager.index(),
            zoom: self.zoom.factor(),
        }
    }

    /// Run the render pipeline for `ticket`. Does not touch the current page.
    ///
    /// # Errors
    ///
    /// [`ViewerError::NoDocument`] when no PDF is loaded, or a stage error
    /// from [`render_pdf_page`].
    pub fn render(&self, ticket: &RenderTicket) -> Result<RenderedPage, ViewerError> {
        let pdf = self
            .document
            .as_ref()
            .and_then(DocumentHandle::as_pdf)
            .ok_or(ViewerError::NoDocument)?;
        render_pdf_page(pdf, ticket.index, ticket.zoom, &self.options)
    }

    /// Install the outcome of `ticket`'s render. Outcomes of superseded
    /// tickets are dropped. Returns whether the outcome was installed.
    ///
    /// # Errors
    ///
    /// Returns the render error of a current ticket, after clearing the
    /// current page.
    pub fn complete(
        &mut self,
        ticket: RenderTicket,
        outcome: Result<RenderedPage, ViewerError>,
    ) -> Result<bool, ViewerError> {
        if ticket.generation != self.generation {
            warn!(
                generation = ticket.generation,
                newest = self.generation,
                page = ticket.index + 1,
                "discarding stale render"
            );
            return Ok(false);
        }
        match outcome {
            Ok(page) => {
                self.current = Some(page);
                Ok(true)
            }
            Err(err) => {
                error!(page = ticket.index + 1, error = %err, "render failed");
                self.current = None;
                Err(err)
            }
        }
    }

    /// Render the current page at the current zoom.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::render`].
    pub fn render_current(&mut self) -> Result<(), ViewerError> {
        let ticket = self.begin_render();
        let outcome = self.render(&ticket);
        self.complete(ticket, outcome).map(|_| ())
    }

    /// Move to 1-based `page`. Returns whether the page changed; moves out of
    /// range or onto the current page render nothing.
    ///
    /// # Errors
    ///
    /// [`ViewerError::NoDocument`] without a loaded PDF, or the render error.
    pub fn go_to(&mut self, page: usize) -> Result<bool, ViewerError> {
        self.navigate(|pager| pager.go_to(page))
    }

    /// # Errors
    ///
    /// See [`PageRenderer::go_to`].
    pub fn first(&mut self) -> Result<bool, ViewerError> {
        self.navigate(Pager::first)
    }

    /// # Errors
    ///
    /// See [`PageRenderer::go_to`].
    pub fn previous(&mut self) -> Result<bool, ViewerError> {
        self.navigate(Pager::previous)
    }

    /// # Errors
    ///
    /// See [`PageRenderer::go_to`].
    pub fn next(&mut self) -> Result<bool, ViewerError> {
        self.navigate(Pager::next)
    }

    /// # Errors
    ///
    /// See [`PageRenderer::go_to`].
    pub fn last(&mut self) -> Result<bool, ViewerError> {
        self.navigate(Pager::last)
    }

    /// Set the zoom factor, clamped to the configured bounds. Returns whether
    /// the zoom changed; a change re-renders the current page.
    ///
    /// # Errors
    ///
    /// The render error, if the re-render fails.
    pub fn set_zoom(&mut self, factor: f64) -> Result<bool, ViewerError> {
        self.rezoom(|zoom| zoom.set(factor))
    }

    /// # Errors
    ///
    /// See [`PageRenderer::set_zoom`].
    pub fn zoom_in(&mut self) -> Result<bool, ViewerError> {
        self.rezoom(Zoom::step_in)
    }

    /// # Errors
    ///
    /// See [`PageRenderer::set_zoom`].
    pub fn zoom_out(&mut self) -> Result<bool, ViewerError> {
        self.rezoom(Zoom::step_out)
    }

    /// Return to the fit-to-width zoom.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::set_zoom`].
    pub fn reset_zoom(&mut self) -> Result<bool, ViewerError> {
        self.rezoom(Zoom::reset)
    }

    /// Fit the page to a container `width` pixels wide.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::set_zoom`].
    pub fn fit_width(&mut self, width: f64) -> Result<bool, ViewerError> {
        self.rezoom(|zoom| zoom.fit_width(width))
    }

    fn navigate(&mut self, step: impl FnOnce(&mut Pager) -> bool) -> Result<bool, ViewerError> {
        if self.document.as_ref().and_then(DocumentHandle::as_pdf).is_none() {
            return Err(ViewerError::NoDocument);
        }
        if !step(&mut self.pager) {
            debug!(page = self.pager.current(), "navigation is a no-op");
            return Ok(false);
        }
        self.render_current()?;
        Ok(true)
    }

    fn rezoom(&mut self, change: impl FnOnce(&mut Zoom) -> bool) -> Result<bool, ViewerError> {
        if !change(&mut self.zoom) {
            return Ok(false);
        }
        debug!(zoom = self.zoom.factor(), "zoom changed");
        if self.document.as_ref().and_then(DocumentHandle::as_pdf).is_some() {
            self.render_current()?;
        }
        Ok(true)
    }
}
