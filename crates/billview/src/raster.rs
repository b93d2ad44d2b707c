//! Rasterization of page content and highlight overlays with tiny-skia.
//!
//! Vector shapes are painted as-is. Text is painted as flat "greeked" bars
//! over each visible run's box; the selectable text layer carries the real
//! characters. Image XObjects arrive from the interpreter as gray
//! placeholders.

use billview_core::{BBox, Color, FillRule, HighlightLayer, PageContent, PathSegment, Viewport};
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Options for [`rasterize`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterOptions {
    /// Largest accepted surface edge in pixels (default: 16384).
    pub max_dimension: u32,
    /// Gray level of greeked text bars (default: 0.55).
    pub text_gray: f64,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            max_dimension: 16_384,
            text_gray: 0.55,
        }
    }
}

/// Selection fill: translucent blue.
const SELECTION_RGBA: [u8; 4] = [0, 100, 255, 77];
/// Search match fill: translucent yellow.
const SEARCH_RGBA: [u8; 4] = [255, 220, 0, 90];
/// Hover outline.
const HOVER_RGBA: [u8; 4] = [0, 100, 255, 200];

/// A rendered page.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Demultiplied RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns the encoder's message when PNG encoding fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, String> {
        self.pixmap.encode_png().map_err(|e| e.to_string())
    }

    /// Paint highlight overlays on top of the page.
    pub fn paint_highlights(&mut self, highlights: &HighlightLayer) {
        for bbox in &highlights.search {
            fill_box(&mut self.pixmap, bbox, SEARCH_RGBA);
        }
        for bbox in &highlights.selection {
            fill_box(&mut self.pixmap, bbox, SELECTION_RGBA);
        }
        if let Some(bbox) = &highlights.hover {
            outline_box(&mut self.pixmap, bbox, HOVER_RGBA);
        }
    }
}

/// Render `page` at `viewport` onto a white surface.
///
/// # Errors
///
/// Returns a message when the viewport is empty or exceeds
/// [`RasterOptions::max_dimension`].
pub fn rasterize(
    page: &PageContent,
    viewport: &Viewport,
    options: &RasterOptions,
) -> Result<Surface, String> {
    let width = viewport.width.ceil();
    let height = viewport.height.ceil();
    if !(width >= 1.0 && height >= 1.0) {
        return Err(format!("empty surface {width}x{height}"));
    }
    let max = f64::from(options.max_dimension);
    if width > max || height > max {
        return Err(format!(
            "surface {width}x{height} exceeds the {} px limit",
            options.max_dimension
        ));
    }
    let mut pixmap = Pixmap::new(width as u32, height as u32)
        .ok_or_else(|| format!("cannot allocate {width}x{height} surface"))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    // Page space is y-up; the surface is y-down.
    let scale = viewport.scale as f32;
    let transform = Transform::from_row(scale, 0.0, 0.0, -scale, 0.0, viewport.height as f32);

    for shape in &page.shapes {
        let Some(path) = build_path(&shape.segments) else {
            continue;
        };
        if let Some(color) = shape.fill {
            let rule = match shape.fill_rule {
                FillRule::NonZeroWinding => tiny_skia::FillRule::Winding,
                FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
            };
            pixmap.fill_path(&path, &paint_for(color), rule, transform, None);
        }
        if let Some(color) = shape.stroke {
            let stroke = Stroke {
                width: shape.line_width as f32,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint_for(color), &stroke, transform, None);
        }
    }

    let text_paint = paint_for(Color::gray(options.text_gray));
    for glyph in page.glyphs.iter().filter(|g| g.visible) {
        let b = glyph.screen_bbox(viewport);
        // Greek the x-height band of the run rather than the full em box.
        let band = BBox::new(b.x0, b.top + b.height() * 0.35, b.x1, b.bottom);
        if let Some(rect) = to_rect(&band) {
            pixmap.fill_rect(rect, &text_paint, Transform::identity(), None);
        }
    }

    Ok(Surface { pixmap })
}

fn build_path(segments: &[PathSegment]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for segment in segments {
        match segment {
            PathSegment::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathSegment::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathSegment::CurveTo { cp1, cp2, end } => pb.cubic_to(
                cp1.x as f32,
                cp1.y as f32,
                cp2.x as f32,
                cp2.y as f32,
                end.x as f32,
                end.y as f32,
            ),
            PathSegment::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(channel(color.r), channel(color.g), channel(color.b), 255);
    paint.anti_alias = true;
    paint
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_rect(bbox: &BBox) -> Option<Rect> {
    Rect::from_ltrb(
        bbox.x0 as f32,
        bbox.top as f32,
        bbox.x1 as f32,
        bbox.bottom as f32,
    )
}

fn fill_box(pixmap: &mut Pixmap, bbox: &BBox, rgba: [u8; 4]) {
    let Some(rect) = to_rect(bbox) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

fn outline_box(pixmap: &mut Pixmap, bbox: &BBox, rgba: [u8; 4]) {
    let Some(rect) = to_rect(bbox) else {
        return;
    };
    let path = PathBuilder::from_rect(rect);
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use billview_core::{Glyph, Point, Shape};

    fn red_square_page() -> PageContent {
        let mut page = PageContent::new(100.0, 100.0);
        page.shapes.push(Shape {
            segments: vec![
                PathSegment::MoveTo(Point::new(10.0, 10.0)),
                PathSegment::LineTo(Point::new(30.0, 10.0)),
                PathSegment::LineTo(Point::new(30.0, 30.0)),
                PathSegment::LineTo(Point::new(10.0, 30.0)),
                PathSegment::ClosePath,
            ],
            fill: Some(Color::new(1.0, 0.0, 0.0)),
            fill_rule: FillRule::NonZeroWinding,
            stroke: None,
            line_width: 1.0,
        });
        page
    }

    #[test]
    fn background_is_white_and_sized_by_viewport() {
        let page = PageContent::new(100.0, 50.0);
        let surface = rasterize(&page, &page.viewport(2.0), &RasterOptions::default()).unwrap();
        assert_eq!((surface.width(), surface.height()), (200, 100));
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn shapes_are_flipped_into_screen_space() {
        let page = red_square_page();
        let surface = rasterize(&page, &page.viewport(1.0), &RasterOptions::default()).unwrap();
        // Page y 10..30 lands at screen rows 70..90.
        assert_eq!(surface.pixel(20, 80), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(20, 20), Some([255, 255, 255, 255]));
    }

    #[test]
    fn invisible_text_is_not_painted() {
        let mut page = PageContent::new(100.0, 100.0);
        page.glyphs.push(Glyph::at("OCR", 10.0, 50.0, 40.0, 20.0).invisible());
        let surface = rasterize(&page, &page.viewport(1.0), &RasterOptions::default()).unwrap();
        assert_eq!(surface.pixel(30, 45), Some([255, 255, 255, 255]));

        page.glyphs[0].visible = true;
        let surface = rasterize(&page, &page.viewport(1.0), &RasterOptions::default()).unwrap();
        assert_ne!(surface.pixel(30, 45), Some([255, 255, 255, 255]));
    }

    #[test]
    fn oversized_surface_is_rejected() {
        let page = PageContent::new(612.0, 792.0);
        let options = RasterOptions {
            max_dimension: 1000,
            ..RasterOptions::default()
        };
        let err = rasterize(&page, &page.viewport(3.0), &options).unwrap_err();
        assert!(err.contains("exceeds"));
        assert!(rasterize(&PageContent::new(0.0, 0.0), &Viewport::for_page(0.0, 0.0, 1.0), &options).is_err());
    }

    #[test]
    fn highlights_tint_the_surface() {
        let page = PageContent::new(100.0, 100.0);
        let mut surface = rasterize(&page, &page.viewport(1.0), &RasterOptions::default()).unwrap();
        let mut highlights = HighlightLayer::new();
        highlights.set_selection(vec![BBox::new(0.0, 0.0, 50.0, 50.0)]);
        surface.paint_highlights(&highlights);
        let [r, g, b, _] = surface.pixel(10, 10).unwrap();
        assert!(b > r && b > 200 && g < 255);
        assert_eq!(surface.pixel(80, 80), Some([255, 255, 255, 255]));
    }

    #[test]
    fn png_encoding_has_signature() {
        let page = red_square_page();
        let surface = rasterize(&page, &page.viewport(1.0), &RasterOptions::default()).unwrap();
        let png = surface.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
