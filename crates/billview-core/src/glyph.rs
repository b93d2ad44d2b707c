//! Positioned text runs and the viewport that maps them onto the screen.

use crate::geometry::{BBox, Ctm, Point};

/// One positioned run of text from a page's text layer.
///
/// Positions are in PDF user space (origin at the bottom-left of the page,
/// y pointing up). Glyphs are never mutated once extracted; a page change or
/// zoom change produces a fresh layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    /// The text content of the run.
    pub text: String,
    /// Text rendering matrix at the start of the run. `e`/`f` locate the
    /// baseline origin.
    pub transform: Ctm,
    /// Advance width of the whole run in page units.
    pub width: f64,
    /// Height of the run in page units (roughly the font size).
    pub height: f64,
    /// Base font name the run was shown with.
    pub font_name: String,
    /// False for runs shown in an invisible render mode, as in the OCR layer
    /// of a scanned bill. Invisible runs are selectable but never painted.
    pub visible: bool,
}

impl Glyph {
    pub fn new(text: impl Into<String>, transform: Ctm, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            transform,
            width,
            height,
            font_name: String::new(),
            visible: true,
        }
    }

    /// Convenience constructor for an unrotated run whose baseline starts at
    /// `(x, y)` in page space.
    pub fn at(text: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(text, Ctm::new(1.0, 0.0, 0.0, 1.0, x, y), width, height)
    }

    /// Screen-space box of this run under `viewport`.
    pub fn screen_bbox(&self, viewport: &Viewport) -> BBox {
        let left = self.transform.e * viewport.scale;
        let baseline = viewport.height - self.transform.f * viewport.scale;
        let width = self.width * viewport.scale;
        let height = self.height * viewport.scale;
        BBox::new(left, baseline - height, left + width, baseline)
    }

    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Number of characters in the run.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Render geometry of the current page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Rendered width in pixels.
    pub width: f64,
    /// Rendered height in pixels.
    pub height: f64,
    /// Scale factor applied to page units.
    pub scale: f64,
}

impl Viewport {
    /// Viewport for a page of `page_width` × `page_height` points at `scale`.
    pub fn for_page(page_width: f64, page_height: f64, scale: f64) -> Self {
        Self {
            width: page_width * scale,
            height: page_height * scale,
            scale,
        }
    }

    /// Whether `p` falls on the rendered surface.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }
}

/// The text layer of one rendered page, paired with the viewport it was
/// rendered at. The two are only ever replaced together.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphLayer {
    viewport: Viewport,
    glyphs: Vec<Glyph>,
}

impl GlyphLayer {
    pub fn new(viewport: Viewport, glyphs: Vec<Glyph>) -> Self {
        Self { viewport, glyphs }
    }

    /// An empty layer, as seen while a page is still loading.
    pub fn empty(viewport: Viewport) -> Self {
        Self::new(viewport, Vec::new())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Screen boxes for every glyph, in layer order.
    pub fn screen_boxes(&self) -> impl Iterator<Item = (&Glyph, BBox)> + '_ {
        self.glyphs
            .iter()
            .map(move |g| (g, g.screen_bbox(&self.viewport)))
    }

    /// First glyph (in layer order) whose screen box contains `p`.
    pub fn hit_test(&self, p: Point) -> Option<usize> {
        self.screen_boxes().position(|(_, b)| b.contains(p))
    }
}
