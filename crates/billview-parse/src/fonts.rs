//! Font loading: code splitting, widths and Unicode mapping.
//!
//! Simple fonts use one-byte codes with `/FirstChar` + `/Widths`; composite
//! (Type0) fonts use two-byte Identity codes with descendant `/W` widths.
//! Text comes from the font's ToUnicode CMap when it has one, else from
//! WinAnsi for simple fonts.

use std::collections::HashMap;

use crate::lopdf_backend::{decode_stream, object_to_f64, resolve_ref};
use crate::to_unicode::ToUnicodeMap;

/// Width used by simple fonts with neither `/Widths` nor `/MissingWidth`.
pub const DEFAULT_GLYPH_WIDTH: f64 = 500.0;
/// Fixed advance of the Courier family.
pub const MONOSPACE_GLYPH_WIDTH: f64 = 600.0;
/// Default `/DW` of CID fonts.
pub const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// A font resolved from a page's resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    base_font: String,
    composite: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    default_width: f64,
    to_unicode: Option<ToUnicodeMap>,
}

impl Font {
    /// A simple font with default metrics, used when the resource is missing.
    pub fn fallback(name: &str) -> Self {
        Self {
            base_font: name.to_string(),
            composite: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: default_width_for(name),
            to_unicode: None,
        }
    }

    /// Build from a font dictionary.
    pub fn from_dict(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Self {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
            .unwrap_or_default();
        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .map(|o| resolve_ref(doc, o))
            .and_then(|o| o.as_stream().ok())
            .and_then(|s| decode_stream(s).ok())
            .and_then(|data| ToUnicodeMap::parse(&data).ok());

        let is_type0 = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        let mut font = Self::fallback(&base_font);
        font.to_unicode = to_unicode;
        if is_type0 {
            font.composite = true;
            font.default_width = DEFAULT_CID_WIDTH;
            if let Some(descendant) = descendant_font(doc, dict) {
                if let Some(dw) = descendant.get(b"DW").ok().and_then(|o| object_to_f64(o).ok()) {
                    font.default_width = dw;
                }
                if let Ok(w) = descendant.get(b"W") {
                    if let Ok(items) = resolve_ref(doc, w).as_array() {
                        font.cid_widths = parse_cid_widths(doc, items);
                    }
                }
            }
        } else {
            font.first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0);
            if let Ok(widths) = dict.get(b"Widths") {
                if let Ok(items) = resolve_ref(doc, widths).as_array() {
                    font.widths = items
                        .iter()
                        .map(|o| object_to_f64(resolve_ref(doc, o)).unwrap_or(0.0))
                        .collect();
                }
            }
            let missing = dict
                .get(b"FontDescriptor")
                .ok()
                .map(|o| resolve_ref(doc, o))
                .and_then(|o| o.as_dict().ok())
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(|o| object_to_f64(o).ok());
            if let Some(missing) = missing {
                font.default_width = missing;
            }
        }
        font
    }

    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Split a shown string into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.composite {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
                .collect()
        } else {
            bytes.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Unicode text for one code.
    pub fn text_for(&self, code: u32) -> String {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.lookup(code)) {
            return text.to_string();
        }
        if self.composite {
            return char::REPLACEMENT_CHARACTER.to_string();
        }
        let byte = [code as u8];
        let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&byte);
        text.into_owned()
    }

    /// Advance width of `code` in glyph space (thousandths of text space).
    pub fn width(&self, code: u32) -> f64 {
        if self.composite {
            return self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width)
    }

    /// Whether `code` is the single-byte space that word spacing applies to.
    pub fn is_word_space(&self, code: u32) -> bool {
        !self.composite && code == 32
    }
}

fn default_width_for(base_font: &str) -> f64 {
    if base_font.starts_with("Courier") {
        MONOSPACE_GLYPH_WIDTH
    } else {
        DEFAULT_GLYPH_WIDTH
    }
}

/// Drop a six-letter subset tag such as `ABCDEF+`.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

fn descendant_font<'a>(
    doc: &'a lopdf::Document,
    dict: &'a lopdf::Dictionary,
) -> Option<&'a lopdf::Dictionary> {
    let descendants = resolve_ref(doc, dict.get(b"DescendantFonts").ok()?);
    let first = descendants.as_array().ok()?.first()?;
    resolve_ref(doc, first).as_dict().ok()
}

/// Parse a CID `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
fn parse_cid_widths(doc: &lopdf::Document, items: &[lopdf::Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < items.len() {
        let Some(start) = object_to_u32(resolve_ref(doc, &items[i])) else {
            break;
        };
        let Some(next) = items.get(i + 1).map(|o| resolve_ref(doc, o)) else {
            break;
        };
        if let Ok(list) = next.as_array() {
            for (offset, w) in list.iter().enumerate() {
                if let Ok(w) = object_to_f64(resolve_ref(doc, w)) {
                    widths.insert(start + offset as u32, w);
                }
            }
            i += 2;
        } else {
            let end = object_to_u32(next);
            let w = items
                .get(i + 2)
                .and_then(|o| object_to_f64(resolve_ref(doc, o)).ok());
            let (Some(end), Some(w)) = (end, w) else {
                break;
            };
            for cid in start..=end {
                widths.insert(cid, w);
            }
            i += 3;
        }
    }
    widths
}

fn object_to_u32(obj: &lopdf::Object) -> Option<u32> {
    object_to_f64(obj)
        .ok()
        .filter(|v| *v >= 0.0)
        .map(|v| v as u32)
}
