//! billview: Render vendor bills, select text on them and route it into form fields.
//!
//! This is the public API facade crate for billview. It re-exports types from
//! billview-core and uses billview-parse for PDF reading and interpretation.
//!
//! # Architecture
//!
//! - **billview-core**: Backend-independent types and algorithms (selection,
//!   search, date and currency coercion, field binding, classification)
//! - **billview-parse**: PDF parsing and content stream interpretation
//! - **billview** (this crate): Document sources, the render pipeline, the
//!   rasterizer, the viewer session and the HTML view template

pub mod document;
pub mod error;
pub mod options;
pub mod raster;
pub mod renderer;
pub mod session;
pub mod source;
pub mod template;

pub use billview_core;
pub use billview_parse;

pub use billview_core::{
    BBox, BindingError, BindingOptions, DateFallback, DocumentKind, FieldHistory, FieldKind,
    FieldTarget, FieldValue, Glyph, GlyphLayer, Granularity, HighlightAction, HighlightLayer,
    HostError, HostForm, MemoryForm, NaiveDate, NumericDateOrder, Point, PointerMove, SearchOptions,
    Selection, SelectionEngine, SelectionKind, SelectionOptions, SetOptions, SupportedTypes,
    UnsupportedReason, Viewport, WriteResult, ZoomOptions,
};
pub use document::{DocumentHandle, Pdf, decode_text};
pub use error::ViewerError;
pub use options::ViewerOptions;
pub use raster::{RasterOptions, Surface, rasterize};
pub use renderer::{PageRenderer, RenderTicket, RenderedPage, render_pdf_page};
pub use session::{Released, ViewerSession};
pub use source::{DocumentSource, FileSource, MemorySource};
pub use template::{ViewerTemplate, render_viewer_html};
