//! Configuration for a viewer session.

use billview_core::{BindingOptions, SearchOptions, SelectionOptions, SupportedTypes, ZoomOptions};
use billview_parse::InterpretOptions;

use crate::raster::RasterOptions;

/// Options for [`PageRenderer`](crate::PageRenderer) and
/// [`ViewerSession`](crate::ViewerSession).
///
/// ```
/// use billview::ViewerOptions;
///
/// let options = ViewerOptions {
///     container_width: Some(1280.0),
///     ..ViewerOptions::default()
/// };
/// assert_eq!(options.zoom.max_zoom, 3.0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewerOptions {
    pub zoom: ZoomOptions,
    pub selection: SelectionOptions,
    pub binding: BindingOptions,
    pub search: SearchOptions,
    /// Allow-list checked before a document is classified.
    pub supported_types: SupportedTypes,
    /// Width of the viewer pane in pixels. When set, a newly loaded PDF
    /// opens at the fit-to-width zoom (default: `None`, zoom 1.0).
    pub container_width: Option<f64>,
    pub raster: RasterOptions,
    /// Maximum nesting depth of form XObjects (default: 10).
    pub max_recursion_depth: usize,
    /// Maximum text runs extracted per page (default: 100,000).
    pub max_glyphs_per_page: usize,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        let interpret = InterpretOptions::default();
        Self {
            zoom: ZoomOptions::default(),
            selection: SelectionOptions::default(),
            binding: BindingOptions::default(),
            search: SearchOptions::default(),
            supported_types: SupportedTypes::default(),
            container_width: None,
            raster: RasterOptions::default(),
            max_recursion_depth: interpret.max_recursion_depth,
            max_glyphs_per_page: interpret.max_glyphs_per_page,
        }
    }
}

impl ViewerOptions {
    pub(crate) fn interpret_options(&self) -> InterpretOptions {
        InterpretOptions {
            max_recursion_depth: self.max_recursion_depth,
            max_glyphs_per_page: self.max_glyphs_per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_components() {
        let options = ViewerOptions::default();
        assert_eq!(options.zoom.min_zoom, 0.5);
        assert_eq!(options.selection.drag_threshold, 5.0);
        assert_eq!(options.max_recursion_depth, 10);
        assert!(options.container_width.is_none());
        assert!(!options.supported_types.is_empty());
    }

    #[test]
    fn interpret_options_follow_limits() {
        let options = ViewerOptions {
            max_recursion_depth: 3,
            max_glyphs_per_page: 50,
            ..ViewerOptions::default()
        };
        let interpret = options.interpret_options();
        assert_eq!(interpret.max_recursion_depth, 3);
        assert_eq!(interpret.max_glyphs_per_page, 50);
    }
}
