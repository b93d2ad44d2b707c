//! Callback trait between the content stream interpreter and whatever
//! collects its output.

use billview_core::{Glyph, PageContent, Shape};

/// Receives text runs and painted shapes as the interpreter walks a page.
///
/// All methods default to no-ops so a handler can subscribe only to the
/// events it needs.
pub trait ContentHandler {
    /// A text-showing operator produced a run.
    fn on_glyph(&mut self, _glyph: Glyph) {}

    /// A path painting operator produced a shape.
    fn on_shape(&mut self, _shape: Shape) {}

    /// A recoverable problem (missing font, unknown XObject) was skipped.
    fn on_warning(&mut self, _message: String) {}
}

impl ContentHandler for PageContent {
    fn on_glyph(&mut self, glyph: Glyph) {
        self.glyphs.push(glyph);
    }

    fn on_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    fn on_warning(&mut self, _message: String) {
        #[cfg(feature = "tracing")]
        tracing::warn!(message = %_message, "content stream warning");
    }
}
