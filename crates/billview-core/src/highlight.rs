//! Visual overlays drawn on top of a rendered page.

use crate::geometry::BBox;

/// Selection, search and hover rectangles for the current page, in viewport
/// pixels.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightLayer {
    pub selection: Vec<BBox>,
    pub search: Vec<BBox>,
    pub hover: Option<BBox>,
}

impl HighlightLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_selection(&mut self, boxes: Vec<BBox>) {
        self.selection = boxes;
    }

    pub fn set_search(&mut self, boxes: Vec<BBox>) {
        self.search = boxes;
    }

    pub fn set_hover(&mut self, hover: Option<BBox>) {
        self.hover = hover;
    }

    /// Drop selection highlights and the hover box. Search matches survive
    /// until the query changes or the page is replaced.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.hover = None;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Drop every overlay.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.search.clear();
        self.hover = None;
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty() && self.search.is_empty() && self.hover.is_none()
    }

    /// All boxes in paint order: search, then selection, then hover.
    pub fn boxes(&self) -> impl Iterator<Item = &BBox> {
        self.search
            .iter()
            .chain(self.selection.iter())
            .chain(self.hover.iter())
    }
}
