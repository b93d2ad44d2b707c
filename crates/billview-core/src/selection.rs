//! Pointer-driven text selection over a page's glyph layer.
//!
//! The engine is a small state machine (`Idle → Dragging → Idle`). A release
//! that moved further than the drag threshold on either axis becomes a
//! rectangle selection; anything shorter is treated as a click on the last
//! hovered glyph.

use crate::geometry::{BBox, Point};
use crate::glyph::{Glyph, GlyphLayer};

/// How much of an intersecting glyph run a rectangle selection keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Granularity {
    /// Split runs into equal-width character cells and keep the cells inside
    /// the rectangle's horizontal span. Pieces on a line are joined directly.
    #[default]
    Character,
    /// Keep whole runs. Pieces on a line are joined with a single space.
    Glyph,
}

impl Granularity {
    fn separator(self) -> &'static str {
        match self {
            Granularity::Character => "",
            Granularity::Glyph => " ",
        }
    }
}

/// Options for [`SelectionEngine`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionOptions {
    /// Minimum pointer travel, in pixels on either axis, for a release to count
    /// as a drag (default: 5.0).
    pub drag_threshold: f64,
    /// Rectangle selection granularity (default: [`Granularity::Character`]).
    pub granularity: Granularity,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            granularity: Granularity::Character,
        }
    }
}

/// How a selection was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionKind {
    Drag,
    Click,
}

/// Result of a completed selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// Reconstructed text, lines separated by `\n`.
    pub text: String,
    /// Screen rectangles of the matched glyphs, one per glyph.
    pub highlights: Vec<BBox>,
    pub kind: SelectionKind,
}

impl Selection {
    fn empty(kind: SelectionKind) -> Self {
        Self {
            text: String::new(),
            highlights: Vec::new(),
            kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One piece of text on a reconstructed line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePiece {
    pub text: String,
    /// Left edge of the piece in viewport pixels.
    pub x0: f64,
}

/// Pieces sharing the same floored baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// `floor(baseline)` in viewport pixels.
    pub key: i64,
    pub pieces: Vec<LinePiece>,
}

impl TextLine {
    /// Join the line's pieces with `separator`.
    pub fn text(&self, separator: &str) -> String {
        self.pieces
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Group pieces into lines keyed by `floor(baseline)`.
///
/// Lines come out top-to-bottom and pieces within a line left-to-right,
/// regardless of input order.
pub fn group_lines(pieces: impl IntoIterator<Item = (f64, LinePiece)>) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    for (baseline, piece) in pieces {
        let key = baseline.floor() as i64;
        match lines.iter_mut().find(|l| l.key == key) {
            Some(line) => line.pieces.push(piece),
            None => lines.push(TextLine {
                key,
                pieces: vec![piece],
            }),
        }
    }
    lines.sort_by_key(|l| l.key);
    for line in &mut lines {
        line.pieces.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    lines
}

/// Select every glyph whose screen box overlaps the interior of `rect`.
///
/// Pure function of the layer and rectangle: repeating it on an unchanged
/// page yields the same result.
pub fn select_rect(layer: &GlyphLayer, rect: BBox, granularity: Granularity) -> Selection {
    let mut pieces = Vec::new();
    let mut highlights = Vec::new();

    for (glyph, bbox) in layer.screen_boxes() {
        if !bbox.overlaps(&rect) {
            continue;
        }
        match granularity {
            Granularity::Glyph => {
                pieces.push((
                    bbox.bottom,
                    LinePiece {
                        text: glyph.text.clone(),
                        x0: bbox.x0,
                    },
                ));
                highlights.push(bbox);
            }
            Granularity::Character => {
                if let Some(clipped) = keep_character_cells(glyph, bbox, rect, &mut pieces) {
                    highlights.push(clipped);
                }
            }
        }
    }

    let lines = group_lines(pieces);
    let text = lines
        .iter()
        .map(|l| l.text(granularity.separator()))
        .collect::<Vec<_>>()
        .join("\n");

    Selection {
        text,
        highlights,
        kind: SelectionKind::Drag,
    }
}

/// Push the character cells of `glyph` that fall inside `rect` horizontally,
/// returning the box spanning the kept cells.
fn keep_character_cells(
    glyph: &Glyph,
    bbox: BBox,
    rect: BBox,
    pieces: &mut Vec<(f64, LinePiece)>,
) -> Option<BBox> {
    let count = glyph.char_count();
    if count == 0 {
        return None;
    }
    let cell = bbox.width() / count as f64;
    let mut span: Option<(f64, f64)> = None;

    for (i, ch) in glyph.text.chars().enumerate() {
        let x0 = bbox.x0 + cell * i as f64;
        let x1 = x0 + cell;
        if !(x0 < rect.x1 && rect.x0 < x1) {
            continue;
        }
        pieces.push((
            bbox.bottom,
            LinePiece {
                text: ch.to_string(),
                x0,
            },
        ));
        span = Some(match span {
            Some((start, _)) => (start, x1),
            None => (x0, x1),
        });
    }

    span.map(|(x0, x1)| BBox::new(x0, bbox.top, x1, bbox.bottom))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { start: Point, current: Point },
}

/// Outcome of a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMove {
    /// Idle pointer; carries the glyph now under it, if any.
    Hover(Option<usize>),
    /// Drag in progress; carries the live selection rectangle.
    Drag(BBox),
}

/// Drag/click/hover state for one rendered page.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    options: SelectionOptions,
    state: DragState,
    last_hovered: Option<usize>,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new(SelectionOptions::default())
    }
}

impl SelectionEngine {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            options,
            state: DragState::Idle,
            last_hovered: None,
        }
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Live rectangle of the drag in progress.
    pub fn drag_rect(&self) -> Option<BBox> {
        match self.state {
            DragState::Dragging { start, current } => Some(BBox::from_corners(start, current)),
            DragState::Idle => None,
        }
    }

    /// Index of the glyph most recently under an idle pointer.
    pub fn last_hovered(&self) -> Option<usize> {
        self.last_hovered
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.state = DragState::Dragging {
            start: p,
            current: p,
        };
    }

    pub fn pointer_move(&mut self, layer: &GlyphLayer, p: Point) -> PointerMove {
        match &mut self.state {
            DragState::Dragging { start, current } => {
                *current = p;
                PointerMove::Drag(BBox::from_corners(*start, p))
            }
            DragState::Idle => {
                self.last_hovered = layer.hit_test(p);
                PointerMove::Hover(self.last_hovered)
            }
        }
    }

    /// Finish the gesture at `p`. Returns `None` if no drag was in progress.
    pub fn pointer_up(&mut self, layer: &GlyphLayer, p: Point) -> Option<Selection> {
        let DragState::Dragging { start, .. } = self.state else {
            return None;
        };
        self.state = DragState::Idle;

        let dx = (p.x - start.x).abs();
        let dy = (p.y - start.y).abs();
        if dx > self.options.drag_threshold || dy > self.options.drag_threshold {
            let rect = BBox::from_corners(start, p);
            Some(select_rect(layer, rect, self.options.granularity))
        } else {
            Some(self.click(layer, p))
        }
    }

    /// Select the last hovered glyph, falling back to a hit test at `p`.
    pub fn click(&self, layer: &GlyphLayer, p: Point) -> Selection {
        let index = self
            .last_hovered
            .filter(|&i| i < layer.glyphs().len())
            .or_else(|| layer.hit_test(p));
        let Some(index) = index else {
            return Selection::empty(SelectionKind::Click);
        };
        let glyph = &layer.glyphs()[index];
        Selection {
            text: glyph.text.clone(),
            highlights: vec![glyph.screen_bbox(layer.viewport())],
            kind: SelectionKind::Click,
        }
    }

    /// Abandon any drag without producing a selection.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Forget all per-page state. Called whenever the glyph layer is replaced.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.last_hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Viewport;

    fn page(glyphs: Vec<Glyph>) -> GlyphLayer {
        GlyphLayer::new(Viewport::for_page(200.0, 200.0, 1.0), glyphs)
    }

    // Screen boxes: "line one text" at y 80..90, "line two text" at y 100..110.
    fn two_lines() -> GlyphLayer {
        page(vec![
            Glyph::at("line one text", 10.0, 110.0, 130.0, 10.0),
            Glyph::at("line two text", 10.0, 90.0, 130.0, 10.0),
        ])
    }

    #[test]
    fn drag_over_two_lines_reconstructs_both() {
        let sel = select_rect(
            &two_lines(),
            BBox::new(0.0, 75.0, 190.0, 115.0),
            Granularity::Character,
        );
        assert_eq!(sel.text, "line one text\nline two text");
        assert_eq!(sel.highlights.len(), 2);
        assert_eq!(sel.kind, SelectionKind::Drag);
    }

    #[test]
    fn line_order_independent_of_input_order() {
        let reversed = page(vec![
            Glyph::at("line two text", 10.0, 90.0, 130.0, 10.0),
            Glyph::at("line one text", 10.0, 110.0, 130.0, 10.0),
        ]);
        let rect = BBox::new(0.0, 75.0, 190.0, 115.0);
        let a = select_rect(&two_lines(), rect, Granularity::Character);
        let b = select_rect(&reversed, rect, Granularity::Character);
        assert_eq!(a.text, b.text);
    }

    #[test]
    fn glyphs_on_a_line_sorted_left_to_right() {
        let layer = page(vec![
            Glyph::at("Total", 100.0, 100.0, 50.0, 10.0),
            Glyph::at("Invoice", 10.0, 100.0, 70.0, 10.0),
        ]);
        let sel = select_rect(&layer, BBox::new(0.0, 85.0, 200.0, 105.0), Granularity::Glyph);
        assert_eq!(sel.text, "Invoice Total");
    }

    #[test]
    fn character_granularity_clips_run() {
        // Ten cells of 10px each starting at x=10.
        let layer = page(vec![Glyph::at("0123456789", 10.0, 100.0, 100.0, 10.0)]);
        let sel = select_rect(&layer, BBox::new(35.0, 85.0, 60.0, 105.0), Granularity::Character);
        assert_eq!(sel.text, "234");
        assert_eq!(sel.highlights, vec![BBox::new(30.0, 90.0, 60.0, 100.0)]);
    }

    #[test]
    fn touching_edge_is_not_selected() {
        let layer = page(vec![Glyph::at("edge", 10.0, 100.0, 40.0, 10.0)]);
        // Glyph box is x 10..50, y 90..100; rectangle starts on its right edge.
        let sel = select_rect(&layer, BBox::new(50.0, 80.0, 90.0, 120.0), Granularity::Glyph);
        assert!(sel.is_empty());
        assert!(sel.highlights.is_empty());
    }

    #[test]
    fn disjoint_rect_selects_nothing() {
        let sel = select_rect(
            &two_lines(),
            BBox::new(150.0, 150.0, 190.0, 190.0),
            Granularity::Character,
        );
        assert_eq!(sel.text, "");
        assert!(sel.highlights.is_empty());
    }

    #[test]
    fn empty_layer_yields_empty_selection() {
        let sel = select_rect(&page(vec![]), BBox::new(0.0, 0.0, 200.0, 200.0), Granularity::Glyph);
        assert!(sel.is_empty());
    }

    #[test]
    fn repeated_selection_is_idempotent() {
        let layer = two_lines();
        let rect = BBox::new(0.0, 75.0, 190.0, 115.0);
        let first = select_rect(&layer, rect, Granularity::Character);
        let second = select_rect(&layer, rect, Granularity::Character);
        assert_eq!(first, second);
    }

    #[test]
    fn group_lines_uses_floored_baseline() {
        let lines = group_lines(vec![
            (
                100.7,
                LinePiece {
                    text: "b".into(),
                    x0: 20.0,
                },
            ),
            (
                100.2,
                LinePiece {
                    text: "a".into(),
                    x0: 10.0,
                },
            ),
            (
                50.0,
                LinePiece {
                    text: "top".into(),
                    x0: 0.0,
                },
            ),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].key, 50);
        assert_eq!(lines[1].text(""), "ab");
    }

    #[test]
    fn engine_drag_produces_selection() {
        let layer = two_lines();
        let mut engine = SelectionEngine::default();
        engine.pointer_down(Point::new(0.0, 75.0));
        assert!(engine.is_dragging());
        let live = engine.pointer_move(&layer, Point::new(100.0, 100.0));
        assert_eq!(live, PointerMove::Drag(BBox::new(0.0, 75.0, 100.0, 100.0)));
        let sel = engine.pointer_up(&layer, Point::new(190.0, 115.0)).unwrap();
        assert!(!engine.is_dragging());
        assert_eq!(sel.text, "line one text\nline two text");
    }

    #[test]
    fn short_release_is_a_click_on_hovered_glyph() {
        let layer = two_lines();
        let mut engine = SelectionEngine::default();
        let hover = engine.pointer_move(&layer, Point::new(20.0, 105.0));
        assert_eq!(hover, PointerMove::Hover(Some(1)));
        engine.pointer_down(Point::new(20.0, 105.0));
        let sel = engine.pointer_up(&layer, Point::new(23.0, 108.0)).unwrap();
        assert_eq!(sel.kind, SelectionKind::Click);
        assert_eq!(sel.text, "line two text");
        assert_eq!(sel.highlights, vec![BBox::new(10.0, 100.0, 140.0, 110.0)]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let layer = two_lines();
        let mut engine = SelectionEngine::default();
        engine.pointer_down(Point::new(20.0, 85.0));
        let sel = engine.pointer_up(&layer, Point::new(25.0, 85.0)).unwrap();
        assert_eq!(sel.kind, SelectionKind::Click);
    }

    #[test]
    fn click_without_hover_falls_back_to_hit_test() {
        let layer = two_lines();
        let engine = SelectionEngine::default();
        let sel = engine.click(&layer, Point::new(20.0, 85.0));
        assert_eq!(sel.text, "line one text");
    }

    #[test]
    fn click_on_blank_area_is_empty() {
        let layer = two_lines();
        let engine = SelectionEngine::default();
        assert!(engine.click(&layer, Point::new(190.0, 10.0)).is_empty());
    }

    #[test]
    fn pointer_up_without_down_is_ignored() {
        let mut engine = SelectionEngine::default();
        assert!(engine.pointer_up(&two_lines(), Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn reset_forgets_hover_and_drag() {
        let layer = two_lines();
        let mut engine = SelectionEngine::default();
        engine.pointer_move(&layer, Point::new(20.0, 85.0));
        engine.pointer_down(Point::new(0.0, 0.0));
        engine.reset();
        assert!(!engine.is_dragging());
        assert_eq!(engine.last_hovered(), None);
    }
}
