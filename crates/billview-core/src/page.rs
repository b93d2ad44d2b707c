//! Extracted page content: the text runs and painted vector shapes of one
//! page, in PDF user space.

use crate::geometry::Point;
use crate::glyph::{Glyph, GlyphLayer, Viewport};

/// Simple RGB color with components in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn gray(level: f64) -> Self {
        Self::new(level, level, level)
    }

    pub fn black() -> Self {
        Self::gray(0.0)
    }

    /// Convert CMYK components with the naive complement formula.
    pub fn from_cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self::new(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Fill rule for path painting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillRule {
    #[default]
    NonZeroWinding,
    EvenOdd,
}

/// A segment of a path in page space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo { cp1: Point, cp2: Point, end: Point },
    ClosePath,
}

/// A painted vector shape.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    pub segments: Vec<PathSegment>,
    /// Fill color, when the shape is filled.
    pub fill: Option<Color>,
    pub fill_rule: FillRule,
    /// Stroke color, when the shape is stroked.
    pub stroke: Option<Color>,
    /// Line width in page units.
    pub line_width: f64,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageContent {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    pub glyphs: Vec<Glyph>,
    pub shapes: Vec<Shape>,
}

impl PageContent {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Viewport of this page rendered at `scale`.
    pub fn viewport(&self, scale: f64) -> Viewport {
        Viewport::for_page(self.width, self.height, scale)
    }

    /// The page's text layer at `scale`.
    pub fn glyph_layer(&self, scale: f64) -> GlyphLayer {
        GlyphLayer::new(self.viewport(scale), self.glyphs.clone())
    }
}
