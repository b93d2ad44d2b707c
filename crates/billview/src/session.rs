//! A viewer session: one renderer, one selection engine and one field binding
//! controller, wired to a host form.

use std::sync::LazyLock;

use billview_core::{
    BindingError, DocumentKind, FieldBindingController, GlyphLayer, HighlightAction,
    HighlightLayer, HostForm, Point, PointerMove, Selection, SelectionEngine, Viewport,
    WriteResult, search_glyphs,
};
use tracing::{debug, warn};

use crate::error::ViewerError;
use crate::options::ViewerOptions;
use crate::raster::Surface;
use crate::renderer::PageRenderer;
use crate::source::DocumentSource;

/// Text layer used while no page is rendered.
static EMPTY_LAYER: LazyLock<GlyphLayer> =
    LazyLock::new(|| GlyphLayer::empty(Viewport::for_page(0.0, 0.0, 1.0)));

/// What a pointer release produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Released {
    pub selection: Selection,
    /// Outcome of writing the selected text to the focused field. `None`
    /// when the selection was empty.
    pub write: Option<Result<WriteResult, BindingError>>,
}

/// Routes pointer, focus and navigation events for one viewer.
///
/// ```ignore
/// let mut session = ViewerSession::new(form, ViewerOptions::default());
/// session.load(&source, url, "application/pdf", Some("pdf")).await?;
/// session.focus("trandate");
/// session.pointer_down(Point::new(70.0, 80.0));
/// let released = session.pointer_up(Point::new(300.0, 130.0));
/// ```
#[derive(Debug)]
pub struct ViewerSession<F: HostForm> {
    form: F,
    renderer: PageRenderer,
    engine: SelectionEngine,
    binding: FieldBindingController,
    highlights: HighlightLayer,
    search_pattern: Option<String>,
}

impl<F: HostForm> ViewerSession<F> {
    pub fn new(form: F, options: ViewerOptions) -> Self {
        let engine = SelectionEngine::new(options.selection.clone());
        let binding = FieldBindingController::new(options.binding.clone());
        Self {
            form,
            renderer: PageRenderer::new(options),
            engine,
            binding,
            highlights: HighlightLayer::new(),
            search_pattern: None,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn binding(&self) -> &FieldBindingController {
        &self.binding
    }

    pub fn engine(&self) -> &SelectionEngine {
        &self.engine
    }

    pub fn highlights(&self) -> &HighlightLayer {
        &self.highlights
    }

    pub fn glyph_layer(&self) -> Option<&GlyphLayer> {
        self.renderer.glyph_layer()
    }

    /// The current page with highlights painted over it.
    pub fn composite(&self) -> Option<Surface> {
        self.renderer
            .current()
            .map(|page| page.composite(&self.highlights))
    }

    /// Load a document, discarding all per-page state. Focus state and field
    /// history are kept.
    ///
    /// # Errors
    ///
    /// See [`PageRenderer::load`].
    pub async fn load<S: DocumentSource + ?Sized>(
        &mut self,
        source: &S,
        url: &str,
        mime_type: &str,
        extension: Option<&str>,
    ) -> Result<DocumentKind, ViewerError> {
        self.engine.reset();
        self.highlights.clear();
        self.search_pattern = None;
        self.renderer.load(source, url, mime_type, extension).await
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.highlights.set_hover(None);
        self.engine.pointer_down(p);
    }

    /// Track the pointer: update the hover box while idle, or the live drag
    /// rectangle while dragging.
    pub fn pointer_move(&mut self, p: Point) -> PointerMove {
        let layer = self.renderer.glyph_layer().unwrap_or(&EMPTY_LAYER);
        let event = self.engine.pointer_move(layer, p);
        if let PointerMove::Hover(hovered) = event {
            let hover = hovered
                .and_then(|i| layer.glyphs().get(i))
                .map(|g| g.screen_bbox(layer.viewport()));
            self.highlights.set_hover(hover);
        }
        event
    }

    /// Finish a gesture: select text, highlight it and apply it to the
    /// focused field. Returns `None` if no drag was in progress.
    pub fn pointer_up(&mut self, p: Point) -> Option<Released> {
        let layer = self.renderer.glyph_layer().unwrap_or(&EMPTY_LAYER);
        let selection = self.engine.pointer_up(layer, p)?;
        self.highlights.clear_selection();
        debug!(
            kind = ?selection.kind,
            text = %selection.text,
            boxes = selection.highlights.len(),
            "selection released"
        );
        if selection.is_empty() {
            return Some(Released {
                selection,
                write: None,
            });
        }

        self.highlights.set_selection(selection.highlights.clone());
        let write = self.write(&selection.text);
        if let Err(err) = &write {
            warn!(error = %err, "selected text not applied");
        }
        Some(Released {
            selection,
            write: Some(write),
        })
    }

    /// Abandon the drag in progress.
    pub fn cancel_drag(&mut self) {
        self.engine.cancel();
    }

    /// The host focused the element `raw_id`.
    pub fn focus(&mut self, raw_id: &str) -> HighlightAction {
        let action = self.binding.on_focus(&self.form, raw_id);
        self.handle(action);
        action
    }

    /// The focused element lost focus.
    pub fn blur(&mut self) -> HighlightAction {
        let action = self.binding.on_blur();
        self.handle(action);
        action
    }

    /// Apply `text` to the focused field.
    ///
    /// # Errors
    ///
    /// [`ViewerError::Binding`] with the binding failure; the form is left
    /// untouched.
    pub fn apply(&mut self, text: &str) -> Result<WriteResult, ViewerError> {
        Ok(self.write(text)?)
    }

    /// Highlight every match of `pattern` on the current page, and on each
    /// page rendered after this until the search is cleared. Returns the
    /// number of matches on the current page.
    pub fn search(&mut self, pattern: &str) -> usize {
        if pattern.is_empty() {
            self.clear_search();
            return 0;
        }
        self.search_pattern = Some(pattern.to_string());
        self.refresh_search()
    }

    pub fn clear_search(&mut self) {
        self.search_pattern = None;
        self.highlights.clear_search();
    }

    /// # Errors
    ///
    /// [`ViewerError::SelectionInProgress`] while dragging; otherwise see
    /// [`PageRenderer::go_to`].
    pub fn go_to(&mut self, page: usize) -> Result<bool, ViewerError> {
        self.relayout(|r| r.go_to(page))
    }

    /// # Errors
    ///
    /// See [`ViewerSession::go_to`].
    pub fn first_page(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::first)
    }

    /// # Errors
    ///
    /// See [`ViewerSession::go_to`].
    pub fn previous_page(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::previous)
    }

    /// # Errors
    ///
    /// See [`ViewerSession::go_to`].
    pub fn next_page(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::next)
    }

    /// # Errors
    ///
    /// See [`ViewerSession::go_to`].
    pub fn last_page(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::last)
    }

    /// # Errors
    ///
    /// [`ViewerError::SelectionInProgress`] while dragging; otherwise see
    /// [`PageRenderer::set_zoom`].
    pub fn set_zoom(&mut self, factor: f64) -> Result<bool, ViewerError> {
        self.relayout(|r| r.set_zoom(factor))
    }

    /// # Errors
    ///
    /// See [`ViewerSession::set_zoom`].
    pub fn zoom_in(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::zoom_in)
    }

    /// # Errors
    ///
    /// See [`ViewerSession::set_zoom`].
    pub fn zoom_out(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::zoom_out)
    }

    /// # Errors
    ///
    /// See [`ViewerSession::set_zoom`].
    pub fn reset_zoom(&mut self) -> Result<bool, ViewerError> {
        self.relayout(PageRenderer::reset_zoom)
    }

    fn write(&mut self, text: &str) -> Result<WriteResult, BindingError> {
        let result = self.binding.apply(&mut self.form, text)?;
        self.highlights.clear_selection();
        Ok(result)
    }

    fn handle(&mut self, action: HighlightAction) {
        if action == HighlightAction::Clear {
            self.highlights.clear_selection();
        }
    }

    fn refresh_search(&mut self) -> usize {
        let (Some(pattern), Some(layer)) = (&self.search_pattern, self.renderer.glyph_layer())
        else {
            self.highlights.clear_search();
            return 0;
        };
        let matches = search_glyphs(layer, pattern, &self.renderer.options().search);
        let count = matches.len();
        self.highlights
            .set_search(matches.into_iter().map(|m| m.bbox).collect());
        count
    }

    fn relayout(
        &mut self,
        change: impl FnOnce(&mut PageRenderer) -> Result<bool, ViewerError>,
    ) -> Result<bool, ViewerError> {
        if self.engine.is_dragging() {
            return Err(ViewerError::SelectionInProgress);
        }
        let result = change(&mut self.renderer);
        if !matches!(result, Ok(false)) {
            self.engine.reset();
            self.highlights.clear_selection();
            self.refresh_search();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billview_core::{FieldKind, MemoryForm};

    fn session() -> ViewerSession<MemoryForm> {
        let form = MemoryForm::new().with_field("memo", FieldKind::LongText);
        ViewerSession::new(form, ViewerOptions::default())
    }

    #[test]
    fn apply_without_focus_leaves_form_untouched() {
        let mut session = session();
        let err = session.apply("some text").unwrap_err();
        assert!(matches!(err, ViewerError::Binding(BindingError::NoActiveField)));
        assert!(session.form().is_untouched());
    }

    #[test]
    fn release_without_drag_is_ignored() {
        let mut session = session();
        assert!(session.pointer_up(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn empty_page_release_yields_empty_selection() {
        let mut session = session();
        session.focus("memo");
        session.pointer_down(Point::new(0.0, 0.0));
        let released = session.pointer_up(Point::new(50.0, 50.0)).unwrap();
        assert!(released.selection.is_empty());
        assert!(released.write.is_none());
        assert!(session.highlights().is_empty());
    }

    #[test]
    fn zoom_is_refused_mid_drag() {
        let mut session = session();
        session.pointer_down(Point::new(0.0, 0.0));
        assert!(matches!(session.zoom_in(), Err(ViewerError::SelectionInProgress)));
        session.cancel_drag();
        assert!(session.zoom_in().unwrap());
    }

    #[test]
    fn apply_writes_focused_field() {
        let mut session = session();
        session.focus("memo");
        let result = session.apply("  Net 30  ").unwrap();
        assert_eq!(result.value.display(), "Net 30");
        assert!(!session.form().is_untouched());
    }

    #[test]
    fn bad_zoom_config_does_not_panic() {
        let options = ViewerOptions {
            zoom: billview_core::ZoomOptions {
                min_zoom: f64::NAN,
                max_zoom: 0.25,
                zoom_step: 0.1,
            },
            ..ViewerOptions::default()
        };
        let mut session = ViewerSession::new(MemoryForm::new(), options);
        // Bounds become [0.25, 0.5].
        assert_eq!(session.renderer().zoom(), 0.5);
        assert!(!session.set_zoom(2.0).unwrap());
        assert!(session.set_zoom(0.3).unwrap());
        assert_eq!(session.renderer().zoom(), 0.3);
    }

    #[test]
    fn pointer_events_without_page_use_empty_layer() {
        let mut session = session();
        assert_eq!(session.pointer_move(Point::new(5.0, 5.0)), PointerMove::Hover(None));
        assert!(session.highlights().hover.is_none());
        session.pointer_down(Point::new(0.0, 0.0));
        assert!(matches!(
            session.pointer_move(Point::new(40.0, 40.0)),
            PointerMove::Drag(_)
        ));
        let released = session.pointer_up(Point::new(40.0, 40.0)).unwrap();
        assert!(released.selection.is_empty());
    }
}
