//! Text search over a glyph layer, returning highlight boxes for each match.

use regex::Regex;

use crate::geometry::BBox;
use crate::glyph::GlyphLayer;

/// Options controlling text search behavior.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Whether to interpret the pattern as a regex (default: `false`).
    /// When `false`, the pattern is treated as a literal string.
    pub regex: bool,
    /// Whether the search is case-sensitive (default: `false`).
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            regex: false,
            case_sensitive: false,
        }
    }
}

/// A single search hit inside one glyph run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchMatch {
    /// The matched text.
    pub text: String,
    /// Screen box covering the matched characters.
    pub bbox: BBox,
    /// Index of the glyph in the layer.
    pub glyph_index: usize,
}

fn build_regex(pattern: &str, options: &SearchOptions) -> Option<Regex> {
    let source = if options.regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    let source = if options.case_sensitive {
        source
    } else {
        format!("(?i){source}")
    };
    Regex::new(&source).ok()
}

/// Search every glyph run of `layer` for `pattern`.
///
/// Matches never span runs. Each match's box is the run's screen box clipped
/// to the matched characters, assuming equal-width characters within a run.
/// Returns an empty vector if the pattern is empty or invalid.
pub fn search_glyphs(layer: &GlyphLayer, pattern: &str, options: &SearchOptions) -> Vec<SearchMatch> {
    if pattern.is_empty() || layer.is_empty() {
        return Vec::new();
    }
    let Some(re) = build_regex(pattern, options) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for (glyph_index, (glyph, bbox)) in layer.screen_boxes().enumerate() {
        let count = glyph.char_count();
        if count == 0 {
            continue;
        }
        let cell = bbox.width() / count as f64;
        for m in re.find_iter(&glyph.text) {
            if m.as_str().is_empty() {
                continue;
            }
            let first = glyph.text[..m.start()].chars().count();
            let len = m.as_str().chars().count();
            let x0 = bbox.x0 + cell * first as f64;
            results.push(SearchMatch {
                text: m.as_str().to_string(),
                bbox: BBox::new(x0, bbox.top, x0 + cell * len as f64, bbox.bottom),
                glyph_index,
            });
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{Glyph, Viewport};

    fn layer() -> GlyphLayer {
        GlyphLayer::new(
            Viewport::for_page(300.0, 200.0, 1.0),
            vec![
                // 10px per character.
                Glyph::at("Invoice Total", 10.0, 100.0, 130.0, 10.0),
                Glyph::at("TOTAL DUE", 10.0, 80.0, 90.0, 10.0),
            ],
        )
    }

    #[test]
    fn search_options_defaults() {
        let opts = SearchOptions::default();
        assert!(!opts.regex);
        assert!(!opts.case_sensitive);
    }

    #[test]
    fn literal_case_insensitive_matches_every_run() {
        let matches = search_glyphs(&layer(), "total", &SearchOptions::default());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text, "Total");
        assert_eq!(matches[0].glyph_index, 0);
        assert_eq!(matches[0].bbox, BBox::new(90.0, 90.0, 140.0, 100.0));
        assert_eq!(matches[1].text, "TOTAL");
        assert_eq!(matches[1].bbox, BBox::new(10.0, 110.0, 60.0, 120.0));
    }

    #[test]
    fn case_sensitive_no_match() {
        let opts = SearchOptions {
            case_sensitive: true,
            ..Default::default()
        };
        let matches = search_glyphs(&layer(), "invoice", &opts);
        assert!(matches.is_empty());
    }

    #[test]
    fn literal_mode_escapes_metacharacters() {
        let layer = GlyphLayer::new(
            Viewport::for_page(100.0, 100.0, 1.0),
            vec![Glyph::at("$1.50", 0.0, 50.0, 50.0, 10.0)],
        );
        let matches = search_glyphs(&layer, "$1.5", &SearchOptions::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "$1.5");
    }

    #[test]
    fn regex_search() {
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        let matches = search_glyphs(&layer(), r"inv\w+", &opts);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "Invoice");
        assert_eq!(matches[0].bbox, BBox::new(10.0, 90.0, 80.0, 100.0));
    }

    #[test]
    fn invalid_regex_returns_empty() {
        let opts = SearchOptions {
            regex: true,
            ..Default::default()
        };
        assert!(search_glyphs(&layer(), "[invalid", &opts).is_empty());
    }

    #[test]
    fn empty_pattern_returns_empty() {
        assert!(search_glyphs(&layer(), "", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn multiple_matches_in_one_run() {
        let layer = GlyphLayer::new(
            Viewport::for_page(100.0, 100.0, 1.0),
            vec![Glyph::at("abab", 0.0, 50.0, 40.0, 10.0)],
        );
        let matches = search_glyphs(&layer, "ab", &SearchOptions::default());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].bbox, BBox::new(20.0, 40.0, 40.0, 50.0));
    }
}
