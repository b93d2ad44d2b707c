//! billview-core: Backend-independent types and algorithms for the bill viewer.
//!
//! This crate provides the glyph/viewport model, pointer selection and line
//! reconstruction, text search, date and currency coercion, the field binding
//! controller and document classification. It knows nothing about PDF parsing
//! or rasterization.

pub mod binding;
pub mod currency;
pub mod date;
pub mod doc_type;
pub mod error;
pub mod field;
pub mod geometry;
pub mod glyph;
pub mod highlight;
pub mod navigation;
pub mod page;
pub mod search;
pub mod selection;
pub mod zoom;

pub use binding::{
    BindingOptions, DateFallback, FieldBindingController, HighlightAction, WriteResult,
    normalize_field_id,
};
pub use chrono::NaiveDate;
pub use currency::strip_currency;
pub use date::{DateDisplayFormat, NumericDateOrder, month_from_name, parse_date};
pub use doc_type::{DocumentKind, SupportedTypes, UnsupportedReason, classify, is_json};
pub use error::{BindingError, HostError};
pub use field::{
    FieldHistory, FieldKind, FieldTarget, FieldValue, HostForm, MemoryForm, SetOptions,
};
pub use geometry::{BBox, Ctm, Point};
pub use glyph::{Glyph, GlyphLayer, Viewport};
pub use highlight::HighlightLayer;
pub use navigation::Pager;
pub use page::{Color, FillRule, PageContent, PathSegment, Shape};
pub use search::{SearchMatch, SearchOptions, search_glyphs};
pub use selection::{
    Granularity, LinePiece, PointerMove, Selection, SelectionEngine, SelectionKind,
    SelectionOptions, TextLine, group_lines, select_rect,
};
pub use zoom::{Zoom, ZoomOptions, fit_width_factor};
